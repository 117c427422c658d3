use std::fmt;

/// The route string associated with an entity, used to namespace message
/// names on the wire.
///
/// Bridged events are qualified with the full address (`widgets/42:update`),
/// while sync messages use only the first path segment (`widgets:update`).
/// A leading separator is insignificant: `/widgets/42` and `widgets/42`
/// produce the same namespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    pub fn new(route: impl Into<String>) -> Self {
        Address(route.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First path segment of the route, skipping a leading separator.
    pub fn namespace(&self) -> &str {
        let mut segments = self.0.split('/');
        match segments.next() {
            Some("") => segments.next().unwrap_or(""),
            Some(first) => first,
            None => "",
        }
    }

    /// Wire name for a sync message: `<namespace>:<verb>`.
    pub fn message_name(&self, verb: &str) -> String {
        format!("{}:{}", self.namespace(), verb)
    }

    /// Wire name for a bridged event: `<address>:<event>`.
    pub fn event_name(&self, event: &str) -> String {
        format!("{}:{}", self.0, event)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(route: &str) -> Self {
        Address::new(route)
    }
}

impl From<String> for Address {
    fn from(route: String) -> Self {
        Address(route)
    }
}

/// An address supplied through sync options: either a fixed route or a
/// provider invoked at resolution time.
pub enum AddressSource {
    Fixed(Address),
    Provider(Box<dyn Fn() -> Address>),
}

impl AddressSource {
    pub fn resolve(&self) -> Address {
        match self {
            AddressSource::Fixed(address) => address.clone(),
            AddressSource::Provider(provider) => provider(),
        }
    }
}

impl From<Address> for AddressSource {
    fn from(address: Address) -> Self {
        AddressSource::Fixed(address)
    }
}

impl From<&str> for AddressSource {
    fn from(route: &str) -> Self {
        AddressSource::Fixed(Address::new(route))
    }
}
