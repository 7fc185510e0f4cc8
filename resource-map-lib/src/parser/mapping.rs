use serde::Serialize;

/// Header synonyms per field. A header matches when its trimmed, lower-cased
/// text contains any synonym.
const NAME_HEADERS: [&str; 3] = ["名稱", "機構", "name"];
const CATEGORY_HEADERS: [&str; 5] = ["類別", "分類", "種類", "category", "type"];
const ADDRESS_HEADERS: [&str; 2] = ["地址", "address"];
const PHONE_HEADERS: [&str; 4] = ["電話", "聯絡", "phone", "contact"];

/// Zero-based column positions used when a header cannot be located.
const DEFAULT_NAME_INDEX: usize = 1;
const DEFAULT_ADDRESS_INDEX: usize = 2;
const DEFAULT_PHONE_INDEX: usize = 3;
const DEFAULT_CATEGORY_INDEX: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnSource {
    Header,
    Positional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnIndex {
    pub index: usize,
    pub source: ColumnSource,
}

impl ColumnIndex {
    fn locate(headers: &[&str], synonyms: &[&str], fallback: usize, field: &str) -> Self {
        let found = headers.iter().position(|h| {
            let h = h.trim().to_lowercase();
            synonyms.iter().any(|s| h.contains(s))
        });
        match found {
            Some(index) => ColumnIndex {
                index,
                source: ColumnSource::Header,
            },
            None => {
                tracing::debug!(
                    "No header found for {}, falling back to column {}",
                    field,
                    fallback + 1
                );
                ColumnIndex {
                    index: fallback,
                    source: ColumnSource::Positional,
                }
            }
        }
    }
}

/// Where each record field lives in a row. Every field is resolved on its
/// own, so a file can end up with a mix of header-matched and positional
/// columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    pub name: ColumnIndex,
    pub category: ColumnIndex,
    pub address: ColumnIndex,
    pub phone: ColumnIndex,
}

impl ColumnMapping {
    pub fn from_headers(headers: &[&str]) -> Self {
        let mapping = Self {
            name: ColumnIndex::locate(headers, &NAME_HEADERS, DEFAULT_NAME_INDEX, "name"),
            category: ColumnIndex::locate(
                headers,
                &CATEGORY_HEADERS,
                DEFAULT_CATEGORY_INDEX,
                "category",
            ),
            address: ColumnIndex::locate(
                headers,
                &ADDRESS_HEADERS,
                DEFAULT_ADDRESS_INDEX,
                "address",
            ),
            phone: ColumnIndex::locate(headers, &PHONE_HEADERS, DEFAULT_PHONE_INDEX, "phone"),
        };
        tracing::debug!("Column mapping: {:?}", mapping);
        mapping
    }

    pub fn is_fully_detected(&self) -> bool {
        [self.name, self.category, self.address, self.phone]
            .iter()
            .all(|c| c.source == ColumnSource::Header)
    }

    pub fn extract_values<'a>(&self, fields: &[&'a str]) -> RowValues<'a> {
        let get = |column: ColumnIndex| fields.get(column.index).copied().filter(|v| !v.is_empty());
        RowValues {
            name: get(self.name),
            category: get(self.category),
            address: get(self.address),
            phone: get(self.phone),
        }
    }
}

/// Raw cell values of one row; `None` when the cell is missing or empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowValues<'a> {
    pub name: Option<&'a str>,
    pub category: Option<&'a str>,
    pub address: Option<&'a str>,
    pub phone: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chinese_headers_are_detected() {
        let mapping = ColumnMapping::from_headers(&["機構名稱", "地址", "聯絡電話", "分類"]);
        assert_eq!(mapping.name.index, 0);
        assert_eq!(mapping.address.index, 1);
        assert_eq!(mapping.phone.index, 2);
        assert_eq!(mapping.category.index, 3);
        assert!(mapping.is_fully_detected());
    }

    #[test]
    fn test_english_headers_are_case_insensitive() {
        let mapping =
            ColumnMapping::from_headers(&["ID", " Resource TYPE ", "Contact", "NAME", "Address"]);
        assert_eq!(mapping.category.index, 1);
        assert_eq!(mapping.phone.index, 2);
        assert_eq!(mapping.name.index, 3);
        assert_eq!(mapping.address.index, 4);
    }

    #[test]
    fn test_missing_headers_fall_back_per_field() {
        let mapping = ColumnMapping::from_headers(&["編號", "單位", "地址", "號碼", "備註"]);
        assert_eq!(
            mapping.address,
            ColumnIndex {
                index: 2,
                source: ColumnSource::Header
            }
        );
        assert_eq!(mapping.name.index, 1);
        assert_eq!(mapping.name.source, ColumnSource::Positional);
        assert_eq!(mapping.phone.index, 3);
        assert_eq!(mapping.category.index, 4);
        assert!(!mapping.is_fully_detected());
    }

    #[test]
    fn test_first_matching_header_wins() {
        let mapping = ColumnMapping::from_headers(&["名稱", "英文name", "地址"]);
        assert_eq!(mapping.name.index, 0);
    }

    #[test]
    fn test_empty_cells_are_missing() {
        let mapping = ColumnMapping::from_headers(&["名稱", "地址", "電話", "類別"]);
        let values = mapping.extract_values(&["A園", "", "02-1"]);
        assert_eq!(values.name, Some("A園"));
        assert_eq!(values.address, None);
        assert_eq!(values.phone, Some("02-1"));
        assert_eq!(values.category, None);
    }
}
