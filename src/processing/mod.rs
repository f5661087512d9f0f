pub mod fields;
pub mod identifier;
pub mod ocr;

pub use fields::FieldExtractor;
pub use identifier::IdentifierExtractor;
pub use ocr::OcrClient;
