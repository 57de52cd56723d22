//! Prompt template for the fight analysis request.
//!
//! The model only gets the raw record; all the arithmetic lives in the
//! heuristic, so the prompt asks for a short qualitative read.

use crate::types::Fighter;

pub fn build_prompt(f1: &Fighter, f2: &Fighter) -> String {
    format!(
        "Expert UFC analysis for {n1} vs {n2}:\n\
         Stats: {n1} ({s1}) vs {n2} ({s2})\n\
         \n\
         Quick analysis:\n\
         1. Advantage and why\n\
         2. Fight outcome (KO/Sub/Dec)\n\
         3. Distance probability\n\
         4. Best bet\n\
         \n\
         Keep response under 100 words.",
        n1 = f1.name,
        n2 = f2.name,
        s1 = stat_line(f1),
        s2 = stat_line(f2),
    )
}

fn stat_line(f: &Fighter) -> String {
    format!(
        "{}, KO:{}, SUB:{}, DEC:{}",
        f.record(),
        f.ko_wins,
        f.sub_wins,
        f.decision_wins
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_both_records() {
        let f1 = Fighter {
            wins: 10,
            losses: 2,
            ko_wins: 6,
            ..Fighter::named("Pereira")
        };
        let f2 = Fighter {
            wins: 8,
            losses: 4,
            sub_wins: 3,
            ..Fighter::named("Hill")
        };
        let prompt = build_prompt(&f1, &f2);
        assert!(prompt.starts_with("Expert UFC analysis for Pereira vs Hill:\n"));
        assert!(prompt.contains("Pereira (10-2, KO:6, SUB:0, DEC:0) vs Hill (8-4, KO:0, SUB:3, DEC:0)"));
        assert!(prompt.ends_with("Keep response under 100 words."));
    }
}
