/// Role required by the role-scoped seller listing.
pub const ROLE_VIEW_SELLER: &str = "view-seller";
