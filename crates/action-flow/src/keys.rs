//! Registry keys used by the shopping scenario

/// Header search input
pub const TXT_SEARCHBOX: &str = "txt_searchbox";

/// Heading of the search results page
pub const LABEL_HEADER: &str = "label_header";

/// Price labels of the result tiles
pub const LABEL_FIRST_PRODUCT_PRICE: &str = "label_FirstProductPrice";

/// Cart button
pub const BTN_CART: &str = "btn_Card";

/// "Complete shopping" button on the cart page
pub const BTN_COMPLETE_SHOPPING: &str = "btn_CompleteShopping";

/// Cookie consent banner accept button
pub const BTN_ACCEPT_COOKIES: &str = "btn_acceptCookies";

/// Login button on the authentication page
pub const BTN_LOGIN: &str = "btn_login";

