use once_cell::sync::Lazy;
use serde::Serialize;

/// One marketplace seller. The catalog is fixed for the process lifetime;
/// the access tier of a route controls who may read it, never its content.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Seller {
    pub id: String,
    pub name: String,
}

impl Seller {
    fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

static SELLERS: Lazy<Vec<Seller>> = Lazy::new(|| {
    vec![
        Seller::new("rchlo", "Riachuelo"),
        Seller::new("opengate", "Open gate"),
        Seller::new("odisseia", "Odisseia"),
        Seller::new("gears", "Gears"),
    ]
});

pub fn sellers() -> &'static [Seller] {
    &SELLERS
}
