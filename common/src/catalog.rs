//! 対応コンセント規格カタログ
//!
//! 分類サービスが返しうる規格コードと、その表示用情報。

use crate::types::{OutletType, ProductRecord};

/// カタログの1エントリ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub region: &'static str,
    pub voltage: &'static str,
    pub current_rating: &'static str,
}

pub const OUTLET_TYPES: &[CatalogEntry] = &[
    CatalogEntry {
        code: "NEMA_5-15R",
        name: "NEMA 5-15R Standard Outlet",
        description: "Standard US household outlet",
        region: "US",
        voltage: "120V",
        current_rating: "15A",
    },
    CatalogEntry {
        code: "NEMA_5-20R",
        name: "NEMA 5-20R Outlet",
        description: "US 20A household outlet",
        region: "US",
        voltage: "120V",
        current_rating: "20A",
    },
    CatalogEntry {
        code: "BS_1363",
        name: "BS 1363 UK Socket",
        description: "Standard UK three-pin wall socket",
        region: "UK",
        voltage: "230V",
        current_rating: "13A",
    },
    CatalogEntry {
        code: "CEE_7/4",
        name: "CEE 7/4 Schuko Socket",
        description: "European Schuko wall socket",
        region: "EU",
        voltage: "230V",
        current_rating: "16A",
    },
    CatalogEntry {
        code: "CEE_7/16",
        name: "CEE 7/16 Europlug Socket",
        description: "European Europlug wall socket",
        region: "EU",
        voltage: "230V",
        current_rating: "2.5A",
    },
    CatalogEntry {
        code: "AS_3112",
        name: "AS 3112 Australian Socket",
        description: "Standard Australian wall socket",
        region: "AU",
        voltage: "230V",
        current_rating: "10A",
    },
    CatalogEntry {
        code: "JIS_C_8303",
        name: "JIS C 8303 Japanese Socket",
        description: "Standard Japanese wall socket",
        region: "JP",
        voltage: "100V",
        current_rating: "15A",
    },
    CatalogEntry {
        code: "GFCI",
        name: "GFCI Protected Socket",
        description: "US GFCI safety wall socket",
        region: "US",
        voltage: "120V",
        current_rating: "15A",
    },
    CatalogEntry {
        code: "USB_A",
        name: "USB-A Socket",
        description: "USB Type-A charging wall socket",
        region: "Universal",
        voltage: "5V",
        current_rating: "2.4A",
    },
    CatalogEntry {
        code: "USB_C",
        name: "USB-C Socket",
        description: "USB Type-C charging wall socket",
        region: "Universal",
        voltage: "5V",
        current_rating: "3A",
    },
];

/// 製品写真が無い場合の代替画像
pub const DEFAULT_NATURAL_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1621905251918-48416bd8575a?w=400";
pub const DEFAULT_PRODUCT_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1558618047-3c8c76ca7d13?w=400";

/// 規格コードからカタログエントリを取得
pub fn describe(code: &str) -> Option<&'static CatalogEntry> {
    OUTLET_TYPES.iter().find(|e| e.code == code)
}

/// 分類サービスが製品情報を返さなかった場合の参照製品
///
/// カタログにあればその情報、無ければコードだけの最小レコード
pub fn reference_product(outlet_type: &OutletType) -> ProductRecord {
    match describe(outlet_type.as_str()) {
        Some(entry) => ProductRecord {
            name: entry.name.to_string(),
            description: entry.description.to_string(),
            voltage: entry.voltage.to_string(),
            current_rating: entry.current_rating.to_string(),
            natural_image_url: DEFAULT_NATURAL_IMAGE_URL.to_string(),
            product_image_url: DEFAULT_PRODUCT_IMAGE_URL.to_string(),
        },
        None => ProductRecord {
            name: outlet_type.to_string(),
            description: String::new(),
            voltage: String::new(),
            current_rating: String::new(),
            natural_image_url: DEFAULT_NATURAL_IMAGE_URL.to_string(),
            product_image_url: DEFAULT_PRODUCT_IMAGE_URL.to_string(),
        },
    }
}
