/// A unit flowing between stages: one item or a batch of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Data<T> {
    Item(T),
    Batch(Vec<T>),
}

impl<T> Data<T> {
    /// `None` for an empty batch, a single item for one element.
    pub fn from_vec(mut items: Vec<T>) -> Option<Self> {
        match items.len() {
            0 => None,
            1 => items.pop().map(Data::Item),
            _ => Some(Data::Batch(items)),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Data::Item(item) => vec![item],
            Data::Batch(items) => items,
        }
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, Data::Batch(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Data::Item(_) => 1,
            Data::Batch(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
