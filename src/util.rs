/// A group of equal values taken from a sorted sequence. `head` is the first occurrence and
/// `rest` holds the repeats, in order.
pub(crate) struct Run<T> {
    pub(crate) head: T,
    pub(crate) rest: Vec<T>,
}

/// Groups an ascending sequence into runs of equal values. When `collapse` is set, repeats are
/// discarded so every run holds exactly one value.
pub(crate) fn runs<T: Ord>(sorted: Vec<T>, collapse: bool) -> Vec<Run<T>> {
    let mut runs: Vec<Run<T>> = Vec::new();
    for value in sorted {
        match runs.last_mut() {
            Some(run) if run.head == value => {
                if !collapse {
                    run.rest.push(value);
                }
            }
            _ => runs.push(Run {
                head: value,
                rest: Vec::new(),
            }),
        }
    }

    runs
}
