use bank::{effects::Effect, sanitize};

/// Trims free text and turns category ids into slugs. Returns how many records changed.
pub fn normalize_effects(effects: &mut [Effect]) -> usize {
    let mut changed = 0;

    for effect in effects.iter_mut() {
        let before = effect.clone();

        effect.category = sanitize(&effect.category);
        for text in [
            &mut effect.category_emoji,
            &mut effect.category_name,
            &mut effect.title,
            &mut effect.question,
            &mut effect.variant_a,
            &mut effect.variant_b,
            &mut effect.current_state,
            &mut effect.source_link,
        ] {
            *text = text.trim().to_string();
        }

        if *effect != before {
            #[cfg(feature = "verbose")]
            println!("Normalized effect {}", effect.id);

            changed += 1;
        }
    }

    effects.sort_by_key(|e| e.id);

    changed
}

/// Records that cannot be served as-is, as human readable problems.
pub fn lint_effects(effects: &[Effect]) -> Vec<String> {
    let mut problems = Vec::new();

    for effect in effects {
        if effect.category.is_empty() {
            problems.push(format!("Effect {} has no category", effect.id));
        }

        if effect.variant_a.is_empty() || effect.variant_b.is_empty() {
            problems.push(format!("Effect {} is missing a variant", effect.id));
        }

        if effect.variant_a.eq_ignore_ascii_case(&effect.variant_b) {
            problems.push(format!("Effect {} has identical variants", effect.id));
        }
    }

    problems
}
