//! Prompt construction for a single trademark pair

use super::models::{DesiredTrademark, RegisteredTrademark};

pub const SYSTEM_MESSAGE: &str =
    "Ти експерт з торговельних марок. Відповідай ТІЛЬКИ валідним JSON без додаткового тексту.";

/// Messages for one comparison, ready for the model client
#[derive(Debug, Clone, PartialEq)]
pub struct PairPrompt {
    pub system: String,
    pub user: String,
    /// Image URLs (data or web) in desired, registered order
    pub images: Vec<String>,
}

impl PairPrompt {
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }
}

/// First `max_chars` characters of `text`, never splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn build_prompt(
    desired: &DesiredTrademark,
    registered: &RegisteredTrademark,
    instructions: &str,
    max_instruction_chars: usize,
) -> PairPrompt {
    let instructions = truncate_chars(instructions, max_instruction_chars);

    let mut user = format!(
        r#"Ти - експерт з інтелектуальної власності. Проаналізуй схожість торговельних марок.

БАЖАНА ДЛЯ РЕЄСТРАЦІЇ ТМ:
- Назва: {desired_name}
- Опис: {desired_description}
- Класи МКТП: {desired_classes}

ЗАРЕЄСТРОВАНА ТМ:
- Номер заявки: {number}
- Власник: {owner}
- Назва: {name}
- Класи МКТП: {classes}

ІНСТРУКЦІЇ ДЛЯ АНАЛІЗУ:
{instructions}
"#,
        desired_name = desired.name,
        desired_description = desired.description,
        desired_classes = desired.classes,
        number = registered.application_number,
        owner = registered.owner,
        name = registered.name,
        classes = registered.classes,
    );

    let images: Vec<String> = [desired.forwardable_image(), registered.forwardable_image()]
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();

    if !images.is_empty() {
        user.push_str(&image_note(desired, registered));
    }

    user.push_str(&reply_shape(registered));

    PairPrompt {
        system: SYSTEM_MESSAGE.to_string(),
        user,
        images,
    }
}

fn image_note(desired: &DesiredTrademark, registered: &RegisteredTrademark) -> String {
    let mut note = String::from("\nДО ЗАПИТУ ДОДАНО ЗОБРАЖЕННЯ:\n");
    if desired.forwardable_image().is_some() {
        note.push_str("- зображення бажаної ТМ\n");
    }
    if registered.forwardable_image().is_some() {
        note.push_str("- зображення зареєстрованої ТМ\n");
    }
    note.push_str("Врахуй їх при оцінці графічної та візуальної схожості.\n");
    note
}

fn reply_shape(registered: &RegisteredTrademark) -> String {
    let info = serde_json::json!({
        "application_number": registered.application_number,
        "owner": registered.owner,
        "name": registered.name,
        "classes": registered.classes,
    });

    format!(
        r#"
Надай аналіз ТІЛЬКИ у валідному JSON форматі без будь-якого іншого тексту:
{{
    "trademark_info": {info},
    "identical_test": {{
        "is_identical": false,
        "percentage": 0,
        "details": "Детальне обгрунтування"
    }},
    "similarity_analysis": {{
        "phonetic": {{"percentage": 0, "details": "Аналіз звучання"}},
        "graphic": {{"percentage": 0, "details": "Аналіз написання"}},
        "semantic": {{"percentage": 0, "details": "Аналіз значення"}},
        "visual": {{"percentage": 0, "details": "Аналіз зображень"}}
    }},
    "goods_services_relation": {{
        "are_related": false,
        "details": "Аналіз спорідненості"
    }},
    "overall_risk": 0,
    "confusion_likelihood": "низька",
    "recommendations": ["рекомендація"]
}}
"#
    )
}
