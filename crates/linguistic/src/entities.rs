//! Gazetteer and pattern based named entities

use crate::parsed::{Entity, Pos, Token};

const GPE_PHRASES: &[&[&str]] = &[
    &["New", "York"],
    &["United", "States"],
    &["United", "Kingdom"],
    &["Hong", "Kong"],
    &["Los", "Angeles"],
    &["San", "Francisco"],
    &["South", "Africa"],
    &["New", "Zealand"],
    &["Saudi", "Arabia"],
];

const GPE_NAMES: &[&str] = &[
    "Paris", "London", "Berlin", "Rome", "Madrid", "Lisbon", "Vienna", "Prague", "Warsaw",
    "Brussels", "Amsterdam", "Helsinki", "Stockholm", "Oslo", "Copenhagen", "Dublin", "Athens",
    "Tokyo", "Beijing", "Shanghai", "Moscow", "Washington", "Chicago", "Boston", "Seattle",
    "Toronto", "Sydney", "Mumbai", "Delhi", "Cairo", "Nairobi", "Lagos", "France", "Germany",
    "Italy", "Spain", "Portugal", "Finland", "Sweden", "Norway", "Denmark", "Ireland",
    "Greece", "Poland", "Austria", "Japan", "China", "Russia", "Canada", "Mexico", "Brazil",
    "India", "England", "Scotland", "Wales", "America", "Australia", "Egypt", "Kenya",
    "Nigeria", "Ukraine", "Texas", "California", "Florida", "Bavaria", "UK", "US", "USA",
    "U.S.",
];

const LOC_NAMES: &[&str] = &[
    "Europe", "Asia", "Africa", "Antarctica", "Alps", "Atlantic", "Pacific", "Mediterranean",
    "Sahara", "Arctic", "Himalayas", "Scandinavia",
];

const FAC_KEYWORDS: &[&str] = &[
    "Airport", "Bridge", "Station", "Stadium", "Tower", "Hospital", "Museum", "Square",
    "Palace", "Cathedral",
];

const MONTHS: &[&str] = &[
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

const WEEKDAYS: &[&str] = &[
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

const RELATIVE_DAYS: &[&str] = &["today", "yesterday", "tomorrow"];

const PERIOD_HEADS: &[&str] = &["last", "next", "this", "every"];

const PERIODS: &[&str] = &[
    "week", "month", "year", "weekend", "summer", "winter", "spring", "autumn", "decade",
    "quarter", "century",
];

const DAY_PARTS: &[&str] = &["morning", "afternoon", "evening", "night"];

const DAY_PART_HEADS: &[&str] = &["this", "last", "yesterday", "tomorrow", "every"];

const CLOCK_SUFFIXES: &[&str] = &["am", "pm", "a.m.", "p.m.", "o'clock"];

fn lower_at(tokens: &[Token], i: usize) -> Option<String> {
    tokens.get(i).map(Token::lower)
}

fn is_year(token: &Token) -> bool {
    token.pos == Pos::Num
        && token.text.len() == 4
        && token
            .text
            .parse::<u32>()
            .is_ok_and(|y| (1000..3000).contains(&y))
}

/// Length and label of an entity starting at `i`, if any
fn match_at(tokens: &[Token], i: usize) -> Option<(usize, &'static str)> {
    let text = tokens[i].text.as_str();
    let lower = tokens[i].lower();

    for phrase in GPE_PHRASES {
        if phrase
            .iter()
            .enumerate()
            .all(|(k, word)| tokens.get(i + k).is_some_and(|t| t.text == *word))
        {
            return Some((phrase.len(), "GPE"));
        }
    }

    if text.chars().next().is_some_and(char::is_uppercase) {
        let mut end = i;
        while tokens
            .get(end)
            .is_some_and(|t| t.text.chars().next().is_some_and(char::is_uppercase))
        {
            end += 1;
        }
        if end > i + 1 && FAC_KEYWORDS.contains(&tokens[end - 1].text.as_str()) {
            return Some((end - i, "FAC"));
        }
    }

    if GPE_NAMES.contains(&text) {
        return Some((1, "GPE"));
    }
    if LOC_NAMES.contains(&text) {
        return Some((1, "LOC"));
    }

    // times
    if matches!(lower.as_str(), "tonight" | "noon" | "midnight") {
        return Some((1, "TIME"));
    }
    if tokens[i].pos == Pos::Num
        && lower_at(tokens, i + 1).is_some_and(|n| CLOCK_SUFFIXES.contains(&n.as_str()))
    {
        return Some((2, "TIME"));
    }
    if DAY_PART_HEADS.contains(&lower.as_str())
        && lower_at(tokens, i + 1).is_some_and(|n| DAY_PARTS.contains(&n.as_str()))
    {
        return Some((2, "TIME"));
    }

    // dates
    if MONTHS.contains(&text) {
        let day_follows = tokens.get(i + 1).is_some_and(|t| t.pos == Pos::Num);
        // "May" and "March" are also a modal and a verb
        if matches!(text, "May" | "March") && !day_follows {
            return None;
        }
        let mut len = 1;
        if day_follows {
            len += 1;
            if tokens.get(i + 2).is_some_and(|t| t.text == ",")
                && tokens.get(i + 3).is_some_and(is_year)
            {
                len += 2;
            }
        } else if tokens.get(i + 1).is_some_and(is_year) {
            len += 1;
        }
        return Some((len, "DATE"));
    }
    if WEEKDAYS.contains(&text) || RELATIVE_DAYS.contains(&lower.as_str()) {
        return Some((1, "DATE"));
    }
    if PERIOD_HEADS.contains(&lower.as_str())
        && lower_at(tokens, i + 1).is_some_and(|n| PERIODS.contains(&n.as_str()))
    {
        return Some((2, "DATE"));
    }
    if is_year(&tokens[i]) && !tokens.get(i + 1).is_some_and(|t| t.pos == Pos::Noun) {
        return Some((1, "DATE"));
    }
    None
}

/// Label entities and mark their tokens; place names become proper nouns.
pub(crate) fn recognize(tokens: &mut [Token]) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let Some((len, label)) = match_at(tokens, i) else {
            i += 1;
            continue;
        };
        let end = (i + len).min(tokens.len());
        for token in &mut tokens[i..end] {
            token.ent_type = Some(label.to_string());
            if matches!(label, "GPE" | "LOC" | "FAC") && token.pos == Pos::Noun {
                token.pos = Pos::Propn;
                token.tag = "NNP".to_string();
                token.lemma = token.text.clone();
            }
        }
        entities.push(Entity {
            label: label.to_string(),
            start: i,
            end,
        });
        i = end;
    }
    entities
}
