use tokio::sync::watch;

/// Last known value of something the board pushes, plus change
/// notification.
///
/// Readers never wait on the link: `get` returns whatever the dispatcher
/// stored last.
#[derive(Debug)]
pub struct CachedValue<T> {
    tx: watch::Sender<T>,
}

impl<T> CachedValue<T>
where
    T: Clone + PartialEq,
{
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Store `value`. Returns whether it differed from the cached one;
    /// subscribers are only woken on a change.
    pub fn update(&self, value: T) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        })
    }

    /// Change the value in place. Returns whether it differs afterwards.
    pub fn update_with(&self, change: impl FnOnce(&mut T)) -> bool {
        self.tx.send_if_modified(|current| {
            let before = current.clone();
            change(current);
            *current != before
        })
    }

    /// Receiver woken on every change.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T> Default for CachedValue<T>
where
    T: Clone + PartialEq + Default,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}
