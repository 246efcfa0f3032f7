//! Health topic, population and assertion-cue lexicon

use std::sync::LazyLock;

use regex::Regex;

/// A health topic with the base potential-harm weight of claims about it
pub struct Topic {
    pub name: &'static str,
    pub base_harm: u8,
    pattern: Regex,
}

impl Topic {
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

fn ci(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("valid lexicon regex")
}

/// Topics in priority order; a claim's primary topic is the first match
pub static TOPICS: LazyLock<Vec<Topic>> = LazyLock::new(|| {
    [
        ("cancer", 70, r"\b(cancers?|tumou?rs?|chemo(therapy)?|oncolog\w*|radiation therapy)\b"),
        ("vaccines", 60, r"\b(vaccin\w*|immuni[sz]\w*|jabs?|mmr|measles)\b"),
        ("diabetes", 65, r"\b(diabet\w*|insulin|blood sugar|metformin)\b"),
        ("antibiotics", 55, r"\b(antibiotics?|amoxicillin|penicillin)\b"),
        ("heart_health", 55, r"\b(heart|blood pressure|hypertension|cholesterol|statins?|stroke)\b"),
        ("pregnancy", 55, r"\b(pregnan\w*|breastfeed\w*|prenatal)\b"),
        ("mental_health", 50, r"\b(depress\w*|anxiety|antidepressants?|mental health)\b"),
        (
            "medications",
            45,
            r"\b(medications?|medicines?|drugs?|prescriptions?|ibuprofen|paracetamol|acetaminophen|aspirin)\b",
        ),
        (
            "infections",
            35,
            r"\b(colds?|flu|influenza|virus(es)?|viral|covid(-19)?|infections?|fevers?|sore throats?|bacteria)\b",
        ),
        (
            "nutrition",
            30,
            r"\b(vitamins?|supplements?|detox\w*|diets?|herbal|juices?|cleanses?|garlic|essential oils?|cinnamon|honey)\b",
        ),
        ("hygiene", 20, r"\b(hand ?washing|wash(ing)? (your )?hands|soap|saniti[sz]ers?)\b"),
        ("hydration", 15, r"\b(hydrat\w*|dehydrat\w*|drink(ing)? water)\b"),
    ]
    .into_iter()
    .map(|(name, base_harm, pattern)| Topic {
        name,
        base_harm,
        pattern: ci(pattern),
    })
    .collect()
});

/// Vulnerable populations in priority order
static POPULATIONS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("infants", r"\b(infants?|bab(y|ies)|newborns?|toddlers?)\b"),
        ("children", r"\b(child(ren)?|kids?|teen(ager)?s?)\b"),
        ("pregnant women", r"\b(pregnant|pregnancy|expecting mothers?)\b"),
        ("older adults", r"\b(elderly|older adults?|seniors?)\b"),
        ("people with diabetes", r"\b(diabetics?|people with diabetes|type [12] diabetes)\b"),
        ("cancer patients", r"\b(cancer patients?|people with cancer|cancer)\b"),
        (
            "chronic disease patients",
            r"\b(chronic\w*|immunocompromised|heart disease|kidney disease|asthma)\b",
        ),
    ]
    .into_iter()
    .map(|(label, pattern)| (label, ci(pattern)))
    .collect()
});

pub static DIRECTIVE_CUE: LazyLock<Regex> = LazyLock::new(|| {
    ci(r"\b(should|must|need to|have to|stop taking|stop using|avoid|instead of|skip|never take|always take|don't take|do not take|throw away|replace|rather than|no need)\b")
});

pub static CAUSAL_CUE: LazyLock<Regex> = LazyLock::new(|| {
    ci(r"\b(causes?|caused|causing|leads? to|results? in|triggers?|linked to|responsible for|gives? you)\b")
});

pub static TREATMENT_CUE: LazyLock<Regex> = LazyLock::new(|| {
    ci(r"\b(cures?|cured|curing|heals?|healed|treats?|treated|reverses?|reversed|eliminates?|kills?|fights?|works? against|gets? rid of|remed(y|ies))\b")
});

pub static PREVENTION_CUE: LazyLock<Regex> = LazyLock::new(|| {
    ci(r"\b(prevents?|prevented|protects?|protection|boosts?|wards? off|reduces? (the )?risk|immun(e|ity))\b")
});

pub static SAFETY_CUE: LazyLock<Regex> = LazyLock::new(|| {
    ci(r"\b(safe|unsafe|dangerous|harmful|harmless|toxic|poison(ous)?|side effects?|addictive|deadly)\b")
});

pub static STATISTICAL_CUE: LazyLock<Regex> = LazyLock::new(|| {
    ci(r"(\d+(\.\d+)?\s?%|\bpercent\b|\btimes (more|less|higher|lower)\b|\bstudies (show|prove)\b|\bmost people\b|\bout of \d+\b)")
});

/// Advice that would postpone or replace proven care
pub static TREATMENT_DELAY_CUE: LazyLock<Regex> = LazyLock::new(|| {
    ci(r"\b(stop taking|stop using|quit(ting)? (your )?(medications?|medicines?|insulin|chemo\w*|treatment)|instead of|no need (for|to)|don't need|do not need|skip(ping)?|avoid (the )?(doctors?|hospitals?|vaccines?|vaccination)|throw away|rather than|replace (your )?(medications?|medicines?|insulin|treatment))\b")
});

pub static CERTAINTY_BOOSTER: LazyLock<Regex> = LazyLock::new(|| {
    ci(r"\b(always|never|cures?|guaranteed|proven|definitely|completely|totally|miracle|instantly|everyone|all)\b|100 ?%")
});

pub static CERTAINTY_HEDGE: LazyLock<Regex> = LazyLock::new(|| {
    ci(r"\b(may|might|could|possibly|perhaps|some say|reportedly|i think|i heard|seems?|probably|apparently)\b")
});

/// Topics mentioned by the text, in priority order
pub fn matched_topics(text: &str) -> Vec<&'static Topic> {
    TOPICS.iter().filter(|t| t.matches(text)).collect()
}

/// Named vulnerable population, or `None` for the general population
pub fn target_population(text: &str) -> Option<&'static str> {
    POPULATIONS
        .iter()
        .find(|(_, pattern)| pattern.is_match(text))
        .map(|(label, _)| *label)
}

/// Whether the text asserts something checkable at all
pub fn has_assertion_cue(text: &str) -> bool {
    DIRECTIVE_CUE.is_match(text)
        || CAUSAL_CUE.is_match(text)
        || TREATMENT_CUE.is_match(text)
        || PREVENTION_CUE.is_match(text)
        || SAFETY_CUE.is_match(text)
        || STATISTICAL_CUE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_topic_priority() {
        let topics = matched_topics("Antibiotics cure colds");
        let names: Vec<_> = topics.iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["antibiotics", "infections"]);
    }

    #[test]
    fn test_population_detection() {
        assert_eq!(target_population("Give honey to babies for coughs"), Some("infants"));
        assert_eq!(target_population("Antibiotics cure colds"), None);
        assert_eq!(
            target_population("Herbal tea cures cancer"),
            Some("cancer patients")
        );
    }

    #[test]
    fn test_cues() {
        assert!(has_assertion_cue("Vaccines cause autism"));
        assert!(!has_assertion_cue("I feel tired today"));
        assert!(TREATMENT_DELAY_CUE.is_match("you can skip chemotherapy"));
        assert!(TREATMENT_DELAY_CUE.is_match("Use cinnamon instead of insulin"));
        assert!(!TREATMENT_DELAY_CUE.is_match("Antibiotics cure colds"));
        assert!(STATISTICAL_CUE.is_match("It works in 90% of cases"));
    }
}
