use diasim_types::{Phone, PhonologicalForm};

use crate::error::MetricError;

/// Unweighted edit distance over the phones of two forms.
///
/// Phones are equal only when symbol and features agree; boundaries are ignored.
pub fn phone_edit_distance(a: &PhonologicalForm, b: &PhonologicalForm) -> Result<usize, MetricError> {
    if a.is_absent() || b.is_absent() {
        return Err(MetricError::AbsentForm);
    }
    let left: Vec<&Phone> = a.phones().collect();
    let right: Vec<&Phone> = b.phones().collect();

    let mut previous: Vec<usize> = (0..=right.len()).collect();
    let mut current = vec![0; right.len() + 1];
    for (i, p) in left.iter().enumerate() {
        current[0] = i + 1;
        for (j, q) in right.iter().enumerate() {
            let substitution = previous[j] + usize::from(p != q);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    Ok(previous[right.len()])
}
