use std::collections::BTreeMap;

pub type FieldValues = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&str, &str)>;

/// Form state: field name to value, with synchronous change notification
#[derive(Default)]
pub struct FieldStore {
    defaults: FieldValues,
    values: FieldValues,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl FieldStore {
    pub fn new<K, V>(defaults: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut store = Self::default();
        store.initialize(defaults);
        store
    }

    /// replace the defaults, and the current values with them
    pub fn initialize<K, V>(&mut self, defaults: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.defaults = defaults.into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.values = self.defaults.clone();
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        self.notify(&name, &value);
        self.values.insert(name, value);
    }

    /// `""` for a field never set
    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn get_all(&self) -> &FieldValues {
        &self.values
    }

    /// restore the last defaults, notifying for every field that changes
    pub fn reset(&mut self) {
        let previous = std::mem::replace(&mut self.values, self.defaults.clone());
        let mut changed = Vec::new();
        for (name, old) in &previous {
            let restored = self.defaults.get(name).map(String::as_str).unwrap_or("");
            if restored != old {
                changed.push((name.clone(), restored.to_string()));
            }
        }
        for (name, value) in &changed {
            self.notify(name, value);
        }
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&str, &str) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self, name: &str, value: &str) {
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(name, value);
        }
    }
}

impl std::fmt::Debug for FieldStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldStore")
            .field("values", &self.values)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
