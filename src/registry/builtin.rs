//! Built-in storefront components: banner, carousel, product list, navbar.

use std::sync::Arc;

use serde_json::json;
use tracing::error;

use super::{ComponentCategory, ComponentDefinition, ComponentRegistry, PropertyKind, PropertySchema, StaticAssetLoader};
use crate::state::Props;

/// Register every built-in definition with a shared static asset loader.
pub fn register_builtins(registry: &ComponentRegistry, asset_prefix: &str) {
    let loader = Arc::new(StaticAssetLoader::new(asset_prefix));
    for definition in builtin_definitions() {
        if let Err(e) = registry.register(definition, loader.clone()) {
            error!(error = %e, "built-in component failed to register");
        }
    }
}

#[must_use]
pub fn builtin_definitions() -> Vec<ComponentDefinition> {
    vec![banner(), carousel(), product_list(), navbar()]
}

fn props(value: serde_json::Value) -> Props {
    value.as_object().cloned().unwrap_or_default()
}

fn text(label: &str) -> PropertySchema {
    PropertySchema::new(PropertyKind::String, label)
}

fn flag(label: &str, default: bool) -> PropertySchema {
    PropertySchema::new(PropertyKind::Boolean, label).default_value(json!(default))
}

fn color(label: &str, default: &str) -> PropertySchema {
    PropertySchema::new(PropertyKind::Color, label).default_value(json!(default))
}

fn banner() -> ComponentDefinition {
    ComponentDefinition {
        component_type: "banner".into(),
        name: "Banner".into(),
        icon: "📢".into(),
        description: "Promotional banner with image, heading and call-to-action button".into(),
        category: ComponentCategory::Promotion,
        default_props: props(json!({
            "image": "https://picsum.photos/1200/400?random=1",
            "title": "Limited-time offer",
            "subtitle": "Up to 50% off everything",
            "buttonText": "Shop now",
            "buttonLink": "/sale",
            "backgroundColor": "#f0f0f0",
            "textColor": "#333333",
            "buttonColor": "#4f46e5",
            "buttonTextColor": "#ffffff",
            "alignment": "center",
            "overlay": true,
            "overlayColor": "rgba(0, 0, 0, 0.3)"
        })),
        property_schema: [
            ("image", PropertySchema::new(PropertyKind::Image, "Banner image").placeholder("Image URL").required()),
            ("title", text("Title").placeholder("Enter a title").required()),
            ("subtitle", text("Subtitle").placeholder("Enter a subtitle")),
            ("buttonText", text("Button text").default_value(json!("Shop now"))),
            ("buttonLink", text("Button link").default_value(json!("/sale"))),
            ("backgroundColor", color("Background color", "#f0f0f0")),
            ("textColor", color("Text color", "#333333")),
            ("buttonColor", color("Button color", "#4f46e5")),
            ("buttonTextColor", color("Button text color", "#ffffff")),
            (
                "alignment",
                PropertySchema::new(PropertyKind::Select, "Content alignment")
                    .options(&[("left", "Left"), ("center", "Center"), ("right", "Right")])
                    .default_value(json!("center")),
            ),
            ("overlay", flag("Show overlay", true)),
            ("overlayColor", color("Overlay color", "rgba(0, 0, 0, 0.3)")),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect(),
        preview: "https://picsum.photos/1200/400".into(),
        tags: vec!["promotion".into(), "banner".into(), "sale".into(), "button".into()],
    }
}

fn carousel() -> ComponentDefinition {
    ComponentDefinition {
        component_type: "carousel".into(),
        name: "Carousel".into(),
        icon: "🎠".into(),
        description: "Image carousel with autoplay, indicators and arrows".into(),
        category: ComponentCategory::Content,
        default_props: props(json!({
            "images": [
                {"src": "https://picsum.photos/800/400?random=1", "alt": "Slide 1", "title": "Summer arrivals", "description": "Up to 50% off"},
                {"src": "https://picsum.photos/800/400?random=2", "alt": "Slide 2", "title": "Flash deals", "description": "$50 off orders over $199"},
                {"src": "https://picsum.photos/800/400?random=3", "alt": "Slide 3", "title": "Best sellers", "description": "1000+ sold"}
            ],
            "autoplay": true,
            "interval": 3000,
            "showIndicators": true,
            "showArrows": true,
            "height": "400px",
            "transition": "fade",
            "pauseOnHover": true
        })),
        property_schema: [
            (
                "images",
                PropertySchema::new(PropertyKind::Array, "Slides")
                    .items([
                        ("src", PropertySchema::new(PropertyKind::Image, "Image URL")),
                        ("alt", text("Alt text")),
                        ("title", text("Title")),
                        ("description", text("Description")),
                    ])
                    .required(),
            ),
            ("autoplay", flag("Autoplay", true)),
            (
                "interval",
                PropertySchema::new(PropertyKind::Number, "Interval (ms)")
                    .range(1000.0, 10000.0)
                    .default_value(json!(3000)),
            ),
            ("showIndicators", flag("Show indicators", true)),
            ("showArrows", flag("Show arrows", true)),
            ("height", text("Height").placeholder("e.g. 400px or 50vh").default_value(json!("400px"))),
            (
                "transition",
                PropertySchema::new(PropertyKind::Select, "Transition")
                    .options(&[("fade", "Fade"), ("slide", "Slide"), ("zoom", "Zoom")])
                    .default_value(json!("fade")),
            ),
            ("pauseOnHover", flag("Pause on hover", true)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect(),
        preview: "https://picsum.photos/800/400".into(),
        tags: vec!["carousel".into(), "images".into(), "autoplay".into(), "home".into()],
    }
}

fn product_list() -> ComponentDefinition {
    let product = |id: &str, name: &str, price: u32, original: u32, sales: u32, rating: f64| {
        json!({
            "id": id,
            "name": name,
            "image": format!("https://picsum.photos/300/300?random={id}"),
            "price": price,
            "originalPrice": original,
            "sales": sales,
            "rating": rating
        })
    };

    ComponentDefinition {
        component_type: "product-list".into(),
        name: "Product list".into(),
        icon: "📦".into(),
        description: "Product showcase in grid or list layout".into(),
        category: ComponentCategory::Product,
        default_props: props(json!({
            "products": [
                product("1", "Summer dress", 199, 299, 500, 4.8),
                product("2", "Casual tee", 99, 159, 800, 4.6),
                product("3", "Running shoes", 399, 599, 1200, 4.9),
                product("4", "Slim jeans", 159, 259, 650, 4.7)
            ],
            "title": "Popular products",
            "description": "Best sellers at limited-time prices",
            "layout": "grid",
            "columns": 4,
            "limit": 8,
            "showPrice": true,
            "showDiscount": true,
            "showAddToCart": true,
            "addToCartText": "Add to cart",
            "showLoadMore": false,
            "loadMoreText": "Load more",
            "loading": false
        })),
        property_schema: [
            (
                "products",
                PropertySchema::new(PropertyKind::Array, "Products").items([
                    ("id", text("Product id")),
                    ("name", text("Name")),
                    ("image", PropertySchema::new(PropertyKind::Image, "Image")),
                    ("price", PropertySchema::new(PropertyKind::Number, "Price")),
                    ("originalPrice", PropertySchema::new(PropertyKind::Number, "Original price")),
                    ("sales", PropertySchema::new(PropertyKind::Number, "Units sold")),
                    ("rating", PropertySchema::new(PropertyKind::Number, "Rating").range(0.0, 5.0)),
                ]),
            ),
            ("title", text("List title").default_value(json!("Popular products"))),
            ("description", PropertySchema::new(PropertyKind::Textarea, "List description").rows(2)),
            (
                "layout",
                PropertySchema::new(PropertyKind::Select, "Layout")
                    .options(&[("grid", "Grid"), ("list", "List"), ("waterfall", "Waterfall")])
                    .default_value(json!("grid")),
            ),
            (
                "columns",
                PropertySchema::new(PropertyKind::Number, "Columns")
                    .range(1.0, 6.0)
                    .default_value(json!(4)),
            ),
            (
                "limit",
                PropertySchema::new(PropertyKind::Number, "Items shown")
                    .range(1.0, 100.0)
                    .default_value(json!(8)),
            ),
            ("showPrice", flag("Show price", true)),
            ("showDiscount", flag("Show discount", true)),
            ("showAddToCart", flag("Show add-to-cart button", true)),
            ("addToCartText", text("Button text").default_value(json!("Add to cart"))),
            ("showLoadMore", flag("Show load more", false)),
            ("loadMoreText", text("Load more text").default_value(json!("Load more"))),
            ("loading", flag("Loading placeholder", false)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect(),
        preview: "https://picsum.photos/300/300".into(),
        tags: vec!["products".into(), "list".into(), "grid".into()],
    }
}

fn navbar() -> ComponentDefinition {
    let menu_item = |label: &str| text(label).required();

    ComponentDefinition {
        component_type: "navbar".into(),
        name: "Navigation bar".into(),
        icon: "🧭".into(),
        description: "Site navigation with logo, menus, dropdowns, search and cart".into(),
        category: ComponentCategory::Navigation,
        default_props: props(json!({
            "logo": {"text": "My Shop", "image": ""},
            "menuItems": [
                {"label": "Home", "url": "/"},
                {"label": "Categories", "children": [
                    {"label": "Clothing", "url": "/category/clothing"},
                    {"label": "Electronics", "url": "/category/electronics"},
                    {"label": "Home goods", "url": "/category/home"},
                    {"label": "Outdoors", "url": "/category/sports"}
                ]},
                {"label": "Deals", "url": "/sale"},
                {"label": "About", "children": [
                    {"label": "Company", "url": "/about/company"},
                    {"label": "Contact", "url": "/about/contact"},
                    {"label": "Careers", "url": "/about/careers"}
                ]}
            ],
            "showSearch": true,
            "showCart": true,
            "showUser": true,
            "cartCount": 0,
            "backgroundColor": "#ffffff",
            "textColor": "#374151",
            "hoverColor": "#4f46e5",
            "dropdownBackgroundColor": "#ffffff",
            "sticky": true,
            "height": "60px"
        })),
        property_schema: [
            (
                "logo",
                PropertySchema::new(PropertyKind::Object, "Logo").fields([
                    ("image", PropertySchema::new(PropertyKind::Image, "Logo image")),
                    ("text", text("Logo text").default_value(json!("My Shop"))),
                ]),
            ),
            (
                "menuItems",
                PropertySchema::new(PropertyKind::Array, "Menu")
                    .items([
                        ("label", menu_item("Menu item")),
                        ("url", text("Link")),
                        (
                            "children",
                            PropertySchema::new(PropertyKind::Array, "Submenu")
                                .items([("label", menu_item("Submenu item")), ("url", text("Link"))]),
                        ),
                    ])
                    .required(),
            ),
            ("showSearch", flag("Show search", true)),
            ("showCart", flag("Show cart", true)),
            ("showUser", flag("Show account", true)),
            (
                "cartCount",
                PropertySchema::new(PropertyKind::Number, "Cart count")
                    .range(0.0, 99.0)
                    .default_value(json!(0)),
            ),
            ("backgroundColor", color("Background color", "#ffffff")),
            ("textColor", color("Text color", "#374151")),
            ("hoverColor", color("Hover color", "#4f46e5")),
            ("dropdownBackgroundColor", color("Dropdown background", "#ffffff")),
            ("sticky", flag("Sticky header", true)),
            ("height", text("Height").placeholder("e.g. 60px").default_value(json!("60px"))),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect(),
        preview: "https://picsum.photos/800/100".into(),
        tags: vec!["navigation".into(), "menu".into(), "cart".into(), "search".into(), "header".into()],
    }
}
