//! Format-independent layout of an analysis report

use crate::analysis::models::{AnalysisReport, ComparisonResult};
use crate::analysis::risk::{ChanceOutlook, RiskLevel};

pub const REPORT_TITLE: &str = "Аналіз торговельних марок";

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading(String),
    Subheading(String),
    /// Bold label followed by a value on the same line
    Field { label: String, value: String },
    Paragraph(String),
    Bullet(String),
}

/// Ordered blocks shared by every renderer
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub analysis_id: String,
    pub blocks: Vec<Block>,
}

impl ReportDocument {
    pub fn from_report(report: &AnalysisReport) -> Self {
        let mut blocks = vec![
            Block::Title(REPORT_TITLE.to_string()),
            field("Ідентифікатор аналізу", &report.analysis_id),
            Block::Heading("Результати аналізу".to_string()),
        ];

        if report.results.is_empty() {
            blocks.push(Block::Paragraph(
                "Зареєстровані торговельні марки для порівняння не надано.".to_string(),
            ));
        }
        for (index, result) in report.results.iter().enumerate() {
            push_result(&mut blocks, index, result);
        }

        let outlook = ChanceOutlook::from_chance(report.overall_chance);
        blocks.push(Block::Heading("Загальний висновок".to_string()));
        blocks.push(field(
            "Шанс успішної реєстрації",
            &format!("{}% (прогноз {})", report.overall_chance, outlook.label()),
        ));
        blocks.push(field(
            "Дата аналізу",
            &report.analysis_date.format("%d.%m.%Y %H:%M UTC").to_string(),
        ));

        Self {
            analysis_id: report.analysis_id.clone(),
            blocks,
        }
    }
}

fn field(label: &str, value: &str) -> Block {
    Block::Field {
        label: label.to_string(),
        value: value.to_string(),
    }
}

fn push_result(blocks: &mut Vec<Block>, index: usize, result: &ComparisonResult) {
    let info = &result.trademark_info;
    let number = if info.application_number.trim().is_empty() {
        (index + 1).to_string()
    } else {
        info.application_number.clone()
    };

    blocks.push(Block::Heading(format!("Торговельна марка №{number}")));
    blocks.push(field("Власник", &info.owner));
    blocks.push(field("Назва", &info.name));
    blocks.push(field("Класи МКТП", &info.classes));
    blocks.push(field(
        "Ризик змішування",
        &format!(
            "{}% (рівень {})",
            result.overall_risk,
            RiskLevel::from_risk(result.overall_risk).label()
        ),
    ));
    if !result.confusion_likelihood.is_empty() {
        blocks.push(field("Ймовірність змішування", &result.confusion_likelihood));
    }

    blocks.push(Block::Subheading("Детальний аналіз схожості".to_string()));

    if result.identical_test.is_identical {
        blocks.push(field(
            "Тест тотожності",
            &format!("ТОТОЖНІ ({}%)", result.identical_test.percentage),
        ));
        push_details(blocks, &result.identical_test.details);
    }

    for (label, score) in result.similarity_analysis.dimensions() {
        blocks.push(field(label, &format!("{}%", score.percentage)));
        push_details(blocks, &score.details);
    }

    let relation = &result.goods_services_relation;
    blocks.push(field(
        "Спорідненість товарів/послуг",
        if relation.are_related { "ТАК" } else { "НІ" },
    ));
    push_details(blocks, &relation.details);

    if !result.recommendations.is_empty() {
        blocks.push(Block::Subheading("Рекомендації".to_string()));
        blocks.extend(result.recommendations.iter().cloned().map(Block::Bullet));
    }
}

fn push_details(blocks: &mut Vec<Block>, details: &str) {
    if !details.trim().is_empty() {
        blocks.push(Block::Paragraph(details.to_string()));
    }
}
