//! Cyrillic to Latin transliteration for the PDF base fonts
//!
//! Follows the Ukrainian national romanization table (KMU resolution
//! No. 55, 2010): `Є Ї Й Ю Я` take their `Ye Yi Y Yu Ya` forms at the start
//! of a word, `зг` becomes `zgh`, and the soft sign and apostrophe are
//! dropped.

/// Transliterate `text`, leaving non-Cyrillic characters untouched
pub fn transliterate(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();

        if is_apostrophe(c) && prev.is_some_and(is_cyrillic) && next.is_some_and(is_cyrillic) {
            continue;
        }
        if !is_cyrillic(c) {
            out.push(c);
            continue;
        }

        let lower = c.to_lowercase().next().unwrap_or(c);
        let word_start = match prev {
            None => true,
            // a dropped apostrophe does not start a new word
            Some(p) if is_apostrophe(p) => !(i >= 2 && chars[i - 2].is_alphabetic()),
            Some(p) => !p.is_alphabetic(),
        };
        let after_z = prev.is_some_and(|p| matches!(p, 'з' | 'З'));
        let latin = latin_for(lower, word_start, after_z);

        if !c.is_uppercase() || latin.is_empty() {
            out.push_str(latin);
        } else if shouting(prev, next) {
            out.push_str(&latin.to_uppercase());
        } else {
            let mut letters = latin.chars();
            if let Some(first) = letters.next() {
                out.extend(first.to_uppercase());
                out.push_str(letters.as_str());
            }
        }
    }

    out
}

/// Map to WinAnsi (cp1252) bytes; characters outside it become `?`
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|&c| c != '\r')
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\t' => b' ',
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

/// Transliterate and encode in one step, turning `№` into `No.`
pub fn pdf_text(text: &str) -> Vec<u8> {
    to_win_ansi(&transliterate(&text.replace('№', "No.")))
}

fn latin_for(lower: char, word_start: bool, after_z: bool) -> &'static str {
    match lower {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' if after_z => "gh",
        'г' => "h",
        'ґ' => "g",
        'д' => "d",
        'е' => "e",
        'є' if word_start => "ye",
        'є' => "ie",
        'ж' => "zh",
        'з' => "z",
        'и' => "y",
        'і' => "i",
        'ї' if word_start => "yi",
        'ї' => "i",
        'й' if word_start => "y",
        'й' => "i",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ь' | 'ъ' => "",
        'ю' if word_start => "yu",
        'ю' => "iu",
        'я' if word_start => "ya",
        'я' => "ia",
        // letters that show up in Russian-language owner names
        'ы' => "y",
        'э' => "e",
        'ё' => "io",
        _ => "?",
    }
}

fn is_cyrillic(c: char) -> bool {
    matches!(c, '\u{0400}'..='\u{04ff}')
}

fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '’' | 'ʼ')
}

/// Uppercase letter inside an all-caps word
fn shouting(prev: Option<char>, next: Option<char>) -> bool {
    next.is_some_and(char::is_uppercase) || prev.is_some_and(char::is_uppercase)
}
