//! Pet-condition inference from free-text listing fragments
//!
//! Portals express pet policies as loose clauses ("猫飼育可（2匹まで）",
//! "敷金1ヶ月追加"). This module joins the fragments found on a page and
//! runs independent detectors over the blob to build the structured
//! `PetConditions` record.
//!
//! The generic ペット可/ペット相談 phrasing is read as allowing both cats
//! and dogs. That is a recall-over-precision choice: a "negotiable"
//! listing stays visible to both audiences until its detail page says
//! otherwise. Portal-dependent looseness, kept deliberately.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::property::PetConditions;

/// Phrases that flag a listing as pet-positive without naming a species.
const GENERIC_PET_OK: [&str; 3] = ["ペット可", "ペット相談", "ペット飼育可"];

/// "猫 ... N匹まで" within one fragment.
static CAT_LIMIT_INLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"猫[^／]*?(\d+)匹まで").unwrap());

/// Parenthesized count following a cat mention.
static CAT_LIMIT_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"（(\d+)匹まで）").unwrap());

/// "敷金＋Nヶ月" style surcharge, optional plus prefix, all ヶ glyphs.
static DEPOSIT_SURCHARGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"敷金\s*(?:プラス|＋|\+)?\s*(\d+(?:\.\d+)?)\s*[ヶヵカか]月").unwrap());

/// Build a `PetConditions` from raw condition fragments.
///
/// Callers only attach the result to a `Property` when at least one
/// fragment was found; calling this with an empty slice still yields a
/// valid all-false record. `notes` is passed through untouched.
pub fn infer_pet_conditions(
    fragments: &[String],
    rent_yen: Option<i64>,
    notes: Option<&str>,
) -> PetConditions {
    let blob = fragments.join("／");

    let generic_ok = GENERIC_PET_OK.iter().any(|phrase| blob.contains(phrase));
    let cat_allowed = blob.contains('猫') || generic_ok;
    let dog_allowed = blob.contains('犬') || generic_ok;
    let small_dog_only = blob.contains("小型犬");

    let cat_limit = CAT_LIMIT_INLINE
        .captures(&blob)
        .and_then(|caps| caps[1].parse().ok())
        .or_else(|| {
            // second pattern: parenthesized count after the cat mention.
            // Scoped to the cat's own fragment so another species' count
            // ("小型犬飼育可（1匹まで）") is never attributed to cats.
            fragments
                .iter()
                .filter_map(|fragment| {
                    let from_cat = fragment.find('猫')?;
                    CAT_LIMIT_PAREN
                        .captures(&fragment[from_cat..])
                        .and_then(|caps| caps[1].parse().ok())
                })
                .next()
        });

    let additional_deposit = rent_yen.and_then(|rent| {
        DEPOSIT_SURCHARGE
            .captures(&blob)
            .and_then(|caps| caps[1].parse::<f64>().ok())
            .map(|months| (rent as f64 * months).round() as i64)
    });

    PetConditions {
        cat_allowed,
        dog_allowed,
        small_dog_only,
        cat_limit,
        additional_deposit,
        notes: notes.map(str::to_string),
    }
}

/// Whether a fragment carries the 敷金＋Nヶ月 surcharge phrasing. Scrapers
/// use this to keep surcharge tags that never name a species.
pub fn mentions_deposit_surcharge(fragment: &str) -> bool {
    DEPOSIT_SURCHARGE.is_match(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn full_policy_from_mixed_fragments() {
        let conditions = infer_pet_conditions(
            &frags(&["猫飼育可（2匹まで）", "小型犬飼育可（1匹まで）", "敷金1ヶ月追加"]),
            Some(85_000),
            None,
        );
        assert!(conditions.cat_allowed);
        assert_eq!(conditions.cat_limit, Some(2));
        assert!(conditions.dog_allowed);
        assert!(conditions.small_dog_only);
        assert_eq!(conditions.additional_deposit, Some(85_000));
        assert_eq!(conditions.notes, None);
    }

    #[test]
    fn generic_phrase_implies_both_species() {
        let conditions = infer_pet_conditions(&frags(&["ペット相談可"]), None, None);
        assert!(conditions.cat_allowed);
        assert!(conditions.dog_allowed);
        assert!(!conditions.small_dog_only);
        assert_eq!(conditions.cat_limit, None);
    }

    #[test]
    fn cat_limit_from_parenthesized_pattern() {
        // the count sits in a separate parenthesis after the cat mention
        let conditions =
            infer_pet_conditions(&frags(&["猫相談／（3匹まで）"]), None, None);
        assert_eq!(conditions.cat_limit, Some(3));
    }

    #[test]
    fn cat_limit_ignores_another_species_count() {
        // the parenthesized count belongs to the dog fragment, not the cat
        let conditions =
            infer_pet_conditions(&frags(&["猫相談", "小型犬飼育可（1匹まで）"]), None, None);
        assert!(conditions.cat_allowed);
        assert!(conditions.dog_allowed);
        assert_eq!(conditions.cat_limit, None);
    }

    #[test]
    fn deposit_surcharge_needs_rent() {
        let conditions = infer_pet_conditions(&frags(&["敷金＋2ヶ月"]), None, None);
        assert_eq!(conditions.additional_deposit, None);

        let conditions = infer_pet_conditions(&frags(&["敷金＋2ヶ月"]), Some(100_000), None);
        assert_eq!(conditions.additional_deposit, Some(200_000));
    }

    #[test]
    fn empty_fragments_yield_all_false() {
        let conditions = infer_pet_conditions(&[], Some(90_000), None);
        assert!(!conditions.cat_allowed);
        assert!(!conditions.dog_allowed);
        assert!(!conditions.small_dog_only);
        assert_eq!(conditions.cat_limit, None);
        assert_eq!(conditions.additional_deposit, None);
        assert_eq!(conditions.notes, None);
    }

    #[test]
    fn notes_pass_through_unmodified() {
        let conditions =
            infer_pet_conditions(&frags(&["犬可"]), None, Some("大型犬は応相談"));
        assert_eq!(conditions.notes.as_deref(), Some("大型犬は応相談"));
        assert!(conditions.dog_allowed);
        assert!(!conditions.cat_allowed);
    }
}
