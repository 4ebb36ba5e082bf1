//! Element names and fixed attributes of the BMEcat 2005 catalog layout.

pub const VERSION: &str = "2005";
pub const NAMESPACE: &str = "http://www.bmecat.org/bmecat/2005.1";

pub const ROOT: &str = "BMECAT";
pub const HEADER: &str = "HEADER";
pub const CATALOG: &str = "CATALOG";
pub const LOCALE: &str = "LOCALE";
pub const TERRITORY: &str = "TERRITORY";
pub const GENERATOR: &str = "GENERATOR_INFO";

pub const ARTICLES: &str = "T_NEW_CATALOG";
pub const ARTICLE: &str = "ARTICLE";
pub const ARTICLE_ID: &str = "SUPPLIER_AID";
pub const ARTICLE_DETAILS: &str = "ARTICLE_DETAILS";
pub const ARTICLE_TITLE: &str = "DESCRIPTION_SHORT";
pub const ARTICLE_DESCR: &str = "DESCRIPTION_LONG";

pub const UNITS: &str = "ARTICLE_ORDER_DETAILS";
pub const MAIN_UNIT: &str = "ORDER_UNIT";
pub const ALT_UNIT: &str = "ALTERNATIVE_UNIT";
pub const UNIT_CODE: &str = "ALTERNATIVE_UNIT_CODE";
pub const UNIT_FACTOR: &str = "ALTERNATIVE_UNIT_FACTOR";

pub const CATEGORY: &str = "ARTICLE_REFERENCE";
pub const CATEGORY_ID: &str = "CATALOG_ID";

pub const IMAGES: &str = "MIME_INFO";
pub const IMAGE: &str = "MIME";
pub const IMAGE_MIME: &str = "MIME_TYPE";
pub const IMAGE_PATH: &str = "MIME_SOURCE";

pub const FEATURES: &str = "ARTICLE_FEATURES";
pub const FEATURE: &str = "FEATURE";
pub const FEATURE_ID: &str = "FID";
pub const FEATURE_NAME: &str = "FNAME";
pub const FEATURE_ORDER: &str = "FORDER";
pub const FEATURE_DESCR: &str = "FDESCR";
pub const FEATURE_UNIT: &str = "FUNIT";
pub const FEATURE_VALUE: &str = "FVALUE";

pub const VARIANTS: &str = "VARIANTS";
pub const VARIANT: &str = "VARIANT";
pub const VARIANT_ID: &str = "SUPPLIER_AID_SUPPLEMENT";
pub const VARIANT_VALUE: &str = "FVALUE";
