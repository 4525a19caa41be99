//! English word lists and lemma rules used by the lexicon tagger

pub(crate) const DETERMINERS: &[&str] = &[
    "the", "a", "an", "this", "these", "those", "every", "each", "some", "any", "no", "another",
    "all", "both", "either", "neither",
];

pub(crate) const POSSESSIVES: &[&str] = &["my", "your", "his", "her", "its", "our", "their"];

pub(crate) const PRONOUNS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "us", "them", "myself",
    "yourself", "himself", "herself", "itself", "ourselves", "themselves", "someone",
    "somebody", "something", "everyone", "everybody", "everything", "anyone", "anybody",
    "anything", "nobody", "nothing", "who", "whom", "whose", "which", "what", "mine", "yours",
    "ours", "theirs",
];

/// Modal forms and their lemmas
pub(crate) const MODALS: &[(&str, &str)] = &[
    ("can", "can"),
    ("ca", "can"),
    ("could", "could"),
    ("may", "may"),
    ("might", "might"),
    ("must", "must"),
    ("shall", "shall"),
    ("should", "should"),
    ("will", "will"),
    ("wo", "will"),
    ("'ll", "will"),
    ("would", "would"),
    ("'d", "would"),
];

/// Forms of be, have and do with lemma and fine tag
pub(crate) const AUXILIARIES: &[(&str, &str, &str)] = &[
    ("am", "be", "VBP"),
    ("'m", "be", "VBP"),
    ("is", "be", "VBZ"),
    ("'s", "be", "VBZ"),
    ("are", "be", "VBP"),
    ("'re", "be", "VBP"),
    ("was", "be", "VBD"),
    ("were", "be", "VBD"),
    ("be", "be", "VB"),
    ("been", "be", "VBN"),
    ("being", "be", "VBG"),
    ("have", "have", "VBP"),
    ("'ve", "have", "VBP"),
    ("has", "have", "VBZ"),
    ("had", "have", "VBD"),
    ("having", "have", "VBG"),
    ("do", "do", "VBP"),
    ("does", "do", "VBZ"),
    ("did", "do", "VBD"),
];

pub(crate) const NEGATIONS: &[&str] = &["not", "n't"];

pub(crate) const ADPOSITIONS: &[&str] = &[
    "in", "on", "at", "by", "with", "from", "of", "for", "into", "onto", "through", "via",
    "over", "under", "about", "after", "before", "during", "inside", "without", "within",
    "between", "across", "toward", "towards", "against", "among", "near", "upon", "throughout",
    "despite", "beyond", "behind", "above", "below", "along", "around", "per", "using", "until",
    "till", "out",
];

pub(crate) const COORDINATORS: &[&str] = &["and", "or", "but", "nor"];

pub(crate) const SUBORDINATORS: &[&str] = &[
    "because", "although", "though", "while", "if", "unless", "whereas", "whether", "cos",
    "than", "when", "where", "whenever", "wherever",
];

pub(crate) const INTERJECTIONS: &[&str] = &[
    "oh", "hello", "hi", "hey", "yes", "yeah", "ok", "okay", "wow", "uh", "um", "please",
];

pub(crate) const ADVERBS: &[&str] = &[
    "very", "really", "just", "too", "also", "still", "already", "again", "always", "often",
    "never", "sometimes", "soon", "now", "then", "there", "here", "today", "yesterday",
    "tomorrow", "tonight", "together", "well", "therefore", "thus", "hence", "however",
    "maybe", "perhaps", "almost", "quite", "rather", "even", "only", "ever", "later", "away",
    "back", "so", "instead", "once", "else", "yet", "meanwhile", "afterwards", "abroad",
];

/// Adverbs that double as adjectives; adverbial right after a verb
pub(crate) const FLAT_ADVERBS: &[&str] = &["hard", "fast", "late", "early", "straight"];

pub(crate) const ADJECTIVES: &[&str] = &[
    "good", "bad", "new", "old", "big", "small", "great", "large", "little", "long", "short",
    "high", "low", "young", "important", "different", "same", "next", "last", "first", "second",
    "third", "public", "private", "local", "national", "social", "political", "economic",
    "able", "free", "full", "real", "clear", "sure", "whole", "major", "main", "recent",
    "strong", "weak", "broad", "broader", "visible", "ready", "happy", "sad", "angry", "busy",
    "easy", "difficult", "simple", "special", "certain", "possible", "available", "own",
    "other", "many", "much", "more", "most", "few", "several", "various", "nice", "fine",
    "friendly", "lovely", "likely", "ugly", "lonely", "elderly", "costly", "silly", "quiet",
    "loud", "safe", "cold", "hot", "warm", "dark", "bright", "true", "false", "dead", "alive",
    "faster", "slower", "better", "worse", "best", "worst", "higher", "lower", "larger",
    "smaller", "bigger", "earlier", "later", "wrong", "right", "huge", "tiny", "key", "ai-based",
];

/// Words ending in -ly that are not adverbs
pub(crate) const NOT_LY_ADVERBS: &[&str] = &[
    "family", "reply", "supply", "apply", "july", "italy", "rally", "ally", "assembly",
    "anomaly", "butterfly", "monopoly", "fly", "belly", "bully", "jelly", "lily",
];

pub(crate) const ADJECTIVE_SUFFIXES: &[&str] =
    &["ful", "ous", "ive", "able", "ible", "less", "ical", "ish"];

pub(crate) const NOT_ADJECTIVES: &[&str] = &[
    "representative", "objective", "initiative", "executive", "relative", "detective",
    "motive", "archive", "table", "cable", "fish", "dish", "wish", "finish", "polish",
    "publish", "vegetable", "bless",
];

/// -ing and -ed words that are nouns
pub(crate) const NOUN_EXCEPTIONS: &[&str] = &[
    "meeting", "building", "morning", "evening", "thing", "king", "ring", "spring", "string",
    "wedding", "ceiling", "ing", "speed", "seed", "feed", "hundred", "breed", "creed", "greed",
    "shed", "weed", "sled", "bed", "red", "nothing", "something", "anything", "everything",
    "funding", "housing", "training", "clothing", "beijing", "wording",
];

pub(crate) const NUMBER_WORDS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "twenty", "thirty", "forty", "fifty", "hundred", "thousand", "million",
    "billion",
];

/// Irregular verb forms and their lemmas
pub(crate) const IRREGULAR_VERBS: &[(&str, &str)] = &[
    ("went", "go"),
    ("gone", "go"),
    ("goes", "go"),
    ("said", "say"),
    ("says", "say"),
    ("made", "make"),
    ("took", "take"),
    ("taken", "take"),
    ("came", "come"),
    ("saw", "see"),
    ("seen", "see"),
    ("knew", "know"),
    ("known", "know"),
    ("got", "get"),
    ("gotten", "get"),
    ("gave", "give"),
    ("given", "give"),
    ("found", "find"),
    ("thought", "think"),
    ("told", "tell"),
    ("became", "become"),
    ("shown", "show"),
    ("left", "leave"),
    ("felt", "feel"),
    ("brought", "bring"),
    ("began", "begin"),
    ("begun", "begin"),
    ("kept", "keep"),
    ("held", "hold"),
    ("wrote", "write"),
    ("written", "write"),
    ("stood", "stand"),
    ("heard", "hear"),
    ("meant", "mean"),
    ("met", "meet"),
    ("ran", "run"),
    ("paid", "pay"),
    ("sat", "sit"),
    ("spoke", "speak"),
    ("spoken", "speak"),
    ("led", "lead"),
    ("grew", "grow"),
    ("grown", "grow"),
    ("lost", "lose"),
    ("fell", "fall"),
    ("fallen", "fall"),
    ("sent", "send"),
    ("built", "build"),
    ("understood", "understand"),
    ("broke", "break"),
    ("broken", "break"),
    ("spent", "spend"),
    ("rose", "rise"),
    ("drove", "drive"),
    ("driven", "drive"),
    ("bought", "buy"),
    ("chose", "choose"),
    ("chosen", "choose"),
    ("sang", "sing"),
    ("sung", "sing"),
    ("ate", "eat"),
    ("eaten", "eat"),
    ("drank", "drink"),
    ("slept", "sleep"),
    ("won", "win"),
    ("taught", "teach"),
    ("caught", "catch"),
    ("fought", "fight"),
    ("sold", "sell"),
    ("flew", "fly"),
    ("flown", "fly"),
    ("threw", "throw"),
    ("thrown", "throw"),
    ("forgot", "forget"),
    ("wore", "wear"),
    ("woke", "wake"),
    ("struck", "strike"),
    ("sought", "seek"),
    ("stole", "steal"),
];

/// Base forms recognised as verbs, inflected forms are derived
pub(crate) const BASE_VERBS: &[&str] = &[
    "go", "say", "make", "take", "come", "see", "know", "get", "give", "find", "think", "tell",
    "become", "show", "leave", "feel", "put", "bring", "begin", "keep", "hold", "write",
    "stand", "hear", "let", "mean", "meet", "run", "pay", "sit", "speak", "lead", "grow",
    "lose", "fall", "send", "build", "understand", "break", "spend", "cut", "rise", "drive",
    "buy", "wear", "choose", "sing", "eat", "drink", "sleep", "win", "read", "use", "want",
    "need", "work", "call", "try", "ask", "move", "live", "believe", "happen", "include",
    "continue", "change", "play", "help", "start", "open", "close", "walk", "talk", "turn",
    "follow", "create", "improve", "reduce", "increase", "decide", "explain", "announce",
    "finish", "arrive", "visit", "reach", "travel", "cancel", "delay", "vote", "fix", "launch",
    "monitor", "react", "stay", "stop", "rain", "look", "watch", "wait", "agree", "allow",
    "add", "offer", "remember", "love", "hope", "expect", "learn", "teach", "catch", "fight",
    "sell", "fly", "throw", "forget", "hide", "wake", "strike", "seek", "steal", "prepare",
    "protect", "provide", "produce", "require", "hit", "enter", "return", "share", "solve",
    "train", "unlock", "pass", "pull", "push", "drop", "carry", "check", "clean", "cook",
    "cross", "dance", "deliver", "design", "discuss", "draw", "earn", "fill", "hate", "join",
    "jump", "kill", "laugh", "listen", "manage", "miss", "notice", "pick", "pray", "promise",
    "raise", "receive", "refuse", "remain", "remove", "repeat", "replace", "reply", "apply",
    "supply", "save", "seem", "serve", "smile", "suggest", "thank", "touch", "trust", "wish",
    "worry", "respond", "emerge", "collapse", "arrest", "evacuate", "shout", "answer",
    "accept", "achieve", "affect", "appear", "argue", "attack", "avoid", "claim", "compare",
    "complain", "confirm", "consider", "contain", "describe", "destroy", "develop", "die",
    "discover", "encourage", "ensure", "establish", "examine", "exist", "fail", "gain",
    "handle", "identify", "imagine", "indicate", "introduce", "invest", "involve", "kick",
    "knock", "lift", "limit", "lock", "measure", "mention", "mix", "obtain", "occur",
    "operate", "organize", "perform", "prefer", "prevent", "prove", "publish", "reflect",
    "rely", "represent", "rescue", "reveal", "rush", "select", "settle", "shake", "shoot",
    "shut", "spread", "suffer", "surround", "survive", "switch", "treat", "trigger", "warn",
    "wash", "welcome", "wonder", "convince", "persuade", "negotiate", "celebrate",
    "demonstrate", "investigate", "recover", "cry", "study", "marry", "hurry", "bury", "copy",
    "deny", "swim", "plan", "beg", "admit", "permit", "commit", "shop", "chat", "rob", "grab",
    "nod", "stir", "refer", "sign", "print", "post", "stress", "shift", "like",
];

pub(crate) fn lookup<'a>(table: &'a [(&'a str, &'a str)], word: &str) -> Option<&'a str> {
    table.iter().find(|(form, _)| *form == word).map(|(_, lemma)| *lemma)
}

fn is_base_verb(word: &str) -> bool {
    BASE_VERBS.contains(&word)
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// "stopp" → "stop"
fn undouble(stem: &str) -> Option<String> {
    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    if n >= 3 && chars[n - 1] == chars[n - 2] && !is_vowel(chars[n - 1]) {
        Some(chars[..n - 1].iter().collect())
    } else {
        None
    }
}

fn first_known(candidates: Vec<String>) -> Option<String> {
    candidates.into_iter().find(|c| is_base_verb(c))
}

/// Lemma and fine tag of a known verb form
pub(crate) fn verb_lemma(word: &str) -> Option<(String, &'static str)> {
    if let Some(lemma) = lookup(IRREGULAR_VERBS, word) {
        let tag = if word.ends_with("en") || word.ends_with("wn") {
            "VBN"
        } else if word.ends_with('s') {
            "VBZ"
        } else {
            "VBD"
        };
        return Some((lemma.to_string(), tag));
    }
    if is_base_verb(word) {
        return Some((word.to_string(), "VB"));
    }
    if let Some(stem) = word.strip_suffix("ing") {
        let mut candidates = vec![stem.to_string(), format!("{stem}e")];
        candidates.extend(undouble(stem));
        if let Some(stem) = stem.strip_suffix('y') {
            candidates.push(format!("{stem}ie"));
        }
        return first_known(candidates).map(|l| (l, "VBG"));
    }
    if let Some(stem) = word.strip_suffix("ied") {
        return first_known(vec![format!("{stem}y")]).map(|l| (l, "VBD"));
    }
    if let Some(stem) = word.strip_suffix("ed") {
        let mut candidates = vec![stem.to_string(), format!("{stem}e")];
        candidates.extend(undouble(stem));
        return first_known(candidates).map(|l| (l, "VBD"));
    }
    if let Some(stem) = word.strip_suffix("ies") {
        return first_known(vec![format!("{stem}y")]).map(|l| (l, "VBZ"));
    }
    if let Some(stem) = word.strip_suffix("es") {
        if let Some(lemma) = first_known(vec![stem.to_string(), format!("{stem}e")]) {
            return Some((lemma, "VBZ"));
        }
    }
    if let Some(stem) = word.strip_suffix('s') {
        return first_known(vec![stem.to_string()]).map(|l| (l, "VBZ"));
    }
    None
}

/// Lemma guess for an unknown -ed/-ing form
pub(crate) fn strip_verb_suffix(word: &str) -> String {
    word.strip_suffix("ing")
        .or_else(|| word.strip_suffix("ed"))
        .unwrap_or(word)
        .to_string()
}

/// Singular form and fine tag of a common noun
pub(crate) fn noun_lemma(word: &str) -> (String, &'static str) {
    const IRREGULAR: &[(&str, &str)] = &[
        ("people", "person"),
        ("men", "man"),
        ("women", "woman"),
        ("children", "child"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("mice", "mouse"),
    ];
    if let Some(lemma) = lookup(IRREGULAR, word) {
        return (lemma.to_string(), "NNS");
    }
    if word.len() > 4 {
        if let Some(stem) = word.strip_suffix("ies") {
            return (format!("{stem}y"), "NNS");
        }
        for suffix in ["sses", "xes", "ches", "shes"] {
            if word.ends_with(suffix) {
                return (word[..word.len() - 2].to_string(), "NNS");
            }
        }
    }
    if word.len() > 3
        && word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
    {
        return (word[..word.len() - 1].to_string(), "NNS");
    }
    (word.to_string(), "NN")
}
