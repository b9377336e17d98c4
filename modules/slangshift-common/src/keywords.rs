//! The tracked slang terms and their competing senses.
//!
//! Each keyword carries the two definitions the classifier chooses between:
//! the established dictionary sense and the newer internet-era sense.

/// One tracked keyword with its sense pair.
#[derive(Debug, Clone, Copy)]
pub struct KeywordDef {
    pub term: &'static str,
    pub old_sense: &'static str,
    pub new_sense: &'static str,
}

/// Every keyword the collector tracks, in collection order.
pub fn keyword_set() -> Vec<KeywordDef> {
    vec![
        KeywordDef {
            term: "slay",
            old_sense: "To kill violently",
            new_sense: "To have a strong favorable effect; to be remarkably impressive",
        },
        KeywordDef {
            term: "lit",
            old_sense: "Past tense of light",
            new_sense: "Exciting/awesome, general term of approval",
        },
        KeywordDef {
            term: "sigma",
            old_sense: "Greek letter",
            new_sense: "Something extremely good/a coolly independent, successful person",
        },
        KeywordDef {
            term: "karen",
            old_sense: "Female name",
            new_sense: "Someone obnoxious, angry, and entitled",
        },
        KeywordDef {
            term: "troll",
            old_sense: "Mythical creature",
            new_sense: "Internet user who provokes others online",
        },
        KeywordDef {
            term: "influencer",
            old_sense: "Anyone who exerts influence",
            new_sense: "A person who generates interest in something by posting about it on social media",
        },
    ]
}

/// Look up the sense pair for a term.
pub fn find(term: &str) -> Option<KeywordDef> {
    keyword_set().into_iter().find(|def| def.term == term)
}
