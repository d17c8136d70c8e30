//! Fixed mapping from storefront proxy paths to marketplace upstream paths.
//!
//! The table is versionless. Proxy paths are what the browser-facing
//! storefront historically exposed; they are kept as the stable names used in
//! logs and traces.

/// A marketplace API operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Token,
    ProductDetail,
    AddCart,
    GetTax,
    OrderTracking,
    CustomerOrders,
    Enquiry,
}

impl Endpoint {
    /// Every endpoint, in table order.
    pub const ALL: [Self; 7] = [
        Self::Token,
        Self::ProductDetail,
        Self::AddCart,
        Self::GetTax,
        Self::OrderTracking,
        Self::CustomerOrders,
        Self::Enquiry,
    ];

    /// Local proxy path.
    #[must_use]
    pub const fn proxy_path(self) -> &'static str {
        match self {
            Self::Token => "/api/token",
            Self::ProductDetail => "/api/product",
            Self::AddCart => "/api/addcart",
            Self::GetTax => "/api/getTax",
            Self::OrderTracking => "/api/orderTracking",
            Self::CustomerOrders => "/api/customer_orders",
            Self::Enquiry => "/api/enquiry",
        }
    }

    /// Path relative to the marketplace base URL.
    #[must_use]
    pub const fn upstream_path(self) -> &'static str {
        match self {
            Self::Token => "generateToken",
            Self::ProductDetail => "productDetails",
            Self::AddCart => "addTOCart",
            Self::GetTax => "calculateTax",
            Self::OrderTracking => "orderTracking",
            Self::CustomerOrders => "customer_orders",
            Self::Enquiry => "enquiries",
        }
    }

    /// Look up an endpoint by its proxy path.
    #[must_use]
    pub fn from_proxy_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.proxy_path() == path)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.proxy_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_mappings() {
        assert_eq!(Endpoint::AddCart.upstream_path(), "addTOCart");
        assert_eq!(Endpoint::GetTax.upstream_path(), "calculateTax");
        assert_eq!(Endpoint::OrderTracking.upstream_path(), "orderTracking");
        assert_eq!(Endpoint::CustomerOrders.upstream_path(), "customer_orders");
        assert_eq!(Endpoint::Enquiry.upstream_path(), "enquiries");
    }

    #[test]
    fn test_from_proxy_path() {
        assert_eq!(
            Endpoint::from_proxy_path("/api/addcart"),
            Some(Endpoint::AddCart)
        );
        assert_eq!(
            Endpoint::from_proxy_path("/api/getTax"),
            Some(Endpoint::GetTax)
        );
        assert_eq!(Endpoint::from_proxy_path("/api/unknown"), None);
    }

    #[test]
    fn test_proxy_paths_are_unique() {
        for endpoint in Endpoint::ALL {
            assert_eq!(
                Endpoint::from_proxy_path(endpoint.proxy_path()),
                Some(endpoint)
            );
        }
    }

    #[test]
    fn test_upstream_paths_are_relative() {
        for endpoint in Endpoint::ALL {
            assert!(!endpoint.upstream_path().starts_with('/'));
        }
    }
}
