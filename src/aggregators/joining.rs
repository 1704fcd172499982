//! String concatenation with delimiter, prefix and suffix.

use crate::aggregator::Aggregator;
use crate::characteristics::Characteristics;
use std::sync::Arc;

/// Accumulator of the joining aggregators.
///
/// Holds the delimited body only; prefix and suffix are applied when the run
/// finishes. An element equal to `""` still counts as an element, so it is
/// separated from its neighbours by the delimiter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Joiner {
    body: String,
    started: bool,
}

impl Joiner {
    fn push(&mut self, item: &str, delimiter: &str) {
        if self.started {
            self.body.push_str(delimiter);
        }
        self.body.push_str(item);
        self.started = true;
    }

    fn append(&mut self, other: Self, delimiter: &str) {
        if !other.started {
            return;
        }
        if self.started {
            self.body.push_str(delimiter);
            self.body.push_str(&other.body);
        } else {
            *self = other;
        }
    }

    fn finish(self, prefix: &str, suffix: &str) -> String {
        let mut out = String::with_capacity(prefix.len() + self.body.len() + suffix.len());
        out.push_str(prefix);
        out.push_str(&self.body);
        out.push_str(suffix);
        out
    }
}

/// Concatenate every element.
pub fn joining<S>() -> Aggregator<S, Joiner, String>
where
    S: AsRef<str> + 'static,
{
    joining_full("", "", "")
}

/// Concatenate every element, separated by `delimiter`.
pub fn joining_with<S>(delimiter: &str) -> Aggregator<S, Joiner, String>
where
    S: AsRef<str> + 'static,
{
    joining_full(delimiter, "", "")
}

/// `prefix`, then every element separated by `delimiter`, then `suffix`.
/// An empty input yields `prefix + suffix`.
///
/// ```
/// use ironfold::joining_full;
///
/// let list = joining_full(",", "[", "]");
/// assert_eq!(list.aggregate(["a", "b", "c"])?, "[a,b,c]");
/// assert_eq!(list.aggregate(Vec::<&str>::new())?, "[]");
/// # anyhow::Result::<()>::Ok(())
/// ```
pub fn joining_full<S>(delimiter: &str, prefix: &str, suffix: &str) -> Aggregator<S, Joiner, String>
where
    S: AsRef<str> + 'static,
{
    let delimiter: Arc<str> = Arc::from(delimiter);
    let prefix = prefix.to_owned();
    let suffix = suffix.to_owned();

    let push = {
        let delimiter = Arc::clone(&delimiter);
        move |acc: &mut Joiner, item: S| acc.push(item.as_ref(), &delimiter)
    };
    let append = move |acc: &mut Joiner, other: Joiner| acc.append(other, &delimiter);
    let finish = move |acc: Joiner| acc.finish(&prefix, &suffix);

    Aggregator::of(Joiner::default, push, append, finish, Characteristics::empty())
}
