use crate::error::WaterfallError;
use core_types::ShareClassInput;
use uuid::Uuid;

/// Resolves the sequence in which classes are processed by the engine.
///
/// With a non-empty `custom_order`, the referenced classes come first in the
/// given order and the remaining classes are appended sorted by seniority
/// descending. Every referenced ID must exist in `classes`; the first
/// unmatched ID fails the whole resolution, since a silently skipped class
/// would make the result wrong rather than absent.
///
/// Without a custom order, all classes are sorted by seniority descending.
/// The sort is stable: classes sharing a seniority keep their input order and
/// form a pari-passu group, resolved later by pro-rata sharing rather than by
/// this ordering step.
pub fn resolve_stacking_order(
    classes: &[ShareClassInput],
    custom_order: Option<&[Uuid]>,
) -> Result<Vec<ShareClassInput>, WaterfallError> {
    match custom_order {
        Some(order) if !order.is_empty() => {
            let mut ordered = Vec::with_capacity(classes.len());
            let mut placed = vec![false; classes.len()];

            for id in order {
                let index = classes
                    .iter()
                    .position(|class| class.id == *id)
                    .ok_or(WaterfallError::UnknownShareClass(*id))?;
                if !placed[index] {
                    placed[index] = true;
                    ordered.push(classes[index].clone());
                }
            }

            let mut remaining: Vec<ShareClassInput> = classes
                .iter()
                .zip(&placed)
                .filter(|(_, placed)| !**placed)
                .map(|(class, _)| class.clone())
                .collect();
            remaining.sort_by(|a, b| b.seniority.cmp(&a.seniority));
            ordered.extend(remaining);

            Ok(ordered)
        }
        _ => {
            let mut ordered = classes.to_vec();
            ordered.sort_by(|a, b| b.seniority.cmp(&a.seniority));
            Ok(ordered)
        }
    }
}
