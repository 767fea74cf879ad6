#[cfg(all(feature = "vi", feature = "en"))]
compile_error!("Cannot enable both 'vi' and 'en' features at the same time");

#[cfg(feature = "vi")]
pub fn mismatch_detail(error: impl std::fmt::Display) -> String {
    format!("không khớp mẫu thông báo - {error}")
}

#[cfg(feature = "vi")]
pub fn unparsed_detail(input: impl std::fmt::Display) -> String {
    format!("phần chưa được phân tích: {input}")
}

#[cfg(feature = "vi")]
pub fn missing_category_detail() -> String {
    "thiếu tên danh mục".to_string()
}

#[cfg(not(feature = "vi"))]
pub fn mismatch_detail(error: impl std::fmt::Display) -> String {
    format!("template mismatch - {error}")
}

#[cfg(not(feature = "vi"))]
pub fn unparsed_detail(input: impl std::fmt::Display) -> String {
    format!("unparsed input: {input}")
}

#[cfg(not(feature = "vi"))]
pub fn missing_category_detail() -> String {
    "missing category name".to_string()
}
