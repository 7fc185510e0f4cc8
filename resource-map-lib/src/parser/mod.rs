mod mapping;

pub use mapping::{ColumnIndex, ColumnMapping, ColumnSource, RowValues};

use csv::{ReaderBuilder, StringRecord};

use crate::error::{LoadStage, ProcessingState, ResourceMapError};
use crate::types::{Category, ResourceRecord, UNKNOWN_ADDRESS, UNKNOWN_NAME, UNKNOWN_PHONE};

pub const DELIMITER: u8 = b',';

/// Rows with fewer fields than this are skipped.
const MIN_FIELDS: usize = 3;

#[derive(Debug, Default)]
pub struct ParsedRecords {
    pub records: Vec<ResourceRecord>,
    pub mapping: Option<ColumnMapping>,
    pub state: ProcessingState,
}

/// Best-effort parser for resource CSV text. Bad rows are skipped and noted in
/// the returned [`ProcessingState`]; parsing itself never fails.
///
/// Quotes are not interpreted: a comma always separates fields and quote
/// characters are stripped from the values afterwards.
#[derive(Debug, Default)]
pub struct RecordParser;

impl RecordParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, text: &str) -> ParsedRecords {
        let mut result = ParsedRecords::default();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .delimiter(DELIMITER)
            .from_reader(text.as_bytes());

        let headers = match reader.headers() {
            Ok(headers) if !is_blank(headers) => headers.clone(),
            Ok(_) => {
                tracing::warn!("CSV text has no header row");
                result
                    .state
                    .add_warning(LoadStage::Parse, "CSV text has no header row");
                return result;
            }
            Err(e) => {
                let e = ResourceMapError::from(e);
                tracing::warn!("Failed to read CSV headers: {}", e);
                result
                    .state
                    .add_warning(LoadStage::Parse, format!("Failed to read CSV headers: {}", e));
                return result;
            }
        };

        tracing::debug!("CSV headers: {:?}", headers);
        let header_fields: Vec<&str> = headers.iter().collect();
        let mapping = ColumnMapping::from_headers(&header_fields);

        for row in reader.records() {
            let record = match row {
                Ok(record) => record,
                Err(e) => {
                    let line = e.position().map(line_index).unwrap_or_default();
                    let e = ResourceMapError::from(e);
                    tracing::warn!("Unreadable row {}, skipping: {}", line, e);
                    result.state.add_row_warning(LoadStage::Parse, line, e.to_string());
                    continue;
                }
            };
            if is_blank(&record) {
                continue;
            }

            // Line index doubles as the record id; the header is line 0.
            let row = record.position().map(line_index).unwrap_or_default();
            if record.len() < MIN_FIELDS {
                tracing::warn!("Row {} has only {} fields, skipping: {:?}", row, record.len(), record);
                result.state.add_row_warning(
                    LoadStage::Parse,
                    row,
                    format!("has only {} fields", record.len()),
                );
                continue;
            }

            let fields: Vec<&str> = record.iter().collect();
            let values = mapping.extract_values(&fields);
            match build_record(row, &values) {
                Some(record) => {
                    tracing::debug!("Accepted row {}: {:?}", row, record);
                    result.records.push(record);
                }
                None => {
                    tracing::warn!("Row {} has no usable address, skipping: {:?}", row, record);
                    result
                        .state
                        .add_row_warning(LoadStage::Parse, row, "has no usable address");
                }
            }
        }

        tracing::info!("Parsed {} resource records", result.records.len());
        result.mapping = Some(mapping);
        result
    }
}

fn line_index(position: &csv::Position) -> usize {
    position.line().saturating_sub(1) as usize
}

/// A whitespace-only line reads as a single blank field.
fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

/// Drop every quote character and surrounding whitespace.
fn clean_text(value: &str) -> String {
    value.replace(['"', '\''], "").trim().to_string()
}

fn build_record(id: usize, values: &RowValues) -> Option<ResourceRecord> {
    let address = clean_text(values.address.unwrap_or(UNKNOWN_ADDRESS));
    if address.is_empty() || address == UNKNOWN_ADDRESS {
        return None;
    }

    let name = clean_text(values.name.unwrap_or(UNKNOWN_NAME));
    let phone = clean_text(values.phone.unwrap_or(UNKNOWN_PHONE));
    let category = Category::normalize(&clean_text(values.category.unwrap_or("")));

    Some(ResourceRecord::new(id, name, category, address, phone))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_row_with_chinese_headers() {
        let parsed = RecordParser::new().parse("名稱,地址,電話,類別\nA園,台北市信義區1號, 02-1,基金會");
        assert_eq!(parsed.records.len(), 1);
        let record = &parsed.records[0];
        assert_eq!(record.id, 1);
        assert_eq!(record.name, "A園");
        assert_eq!(record.address, "台北市信義區1號");
        assert_eq!(record.phone, "02-1");
        assert_eq!(record.category, Category::Foundation);
        assert!(record.position.is_none());
        assert!(!parsed.state.has_warnings());
    }

    #[test]
    fn test_short_rows_and_blank_lines_are_skipped() {
        let text = "名稱,地址,電話,類別\n\nA,台北市1號,02\nB,台北市2號\n   \nC,台北市3號,03,教會\n";
        let parsed = RecordParser::new().parse(text);
        let ids: Vec<usize> = parsed.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 5]);
        assert_eq!(parsed.records[1].category, Category::Church);
        assert_eq!(parsed.state.affected_records(LoadStage::Parse), vec![3]);
    }

    #[test]
    fn test_empty_or_placeholder_address_is_rejected() {
        let text = "名稱,地址,電話,類別\nA,,02,教會\nB,\"  \",03,教會\nC,未知地址,04,教會\nD,\"桃園市1號\",05,里長";
        let parsed = RecordParser::new().parse(text);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].name, "D");
        assert_eq!(parsed.records[0].address, "桃園市1號");
        assert_eq!(parsed.records[0].category, Category::Chief);
        assert_eq!(parsed.state.affected_records(LoadStage::Parse), vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_fields_take_placeholders() {
        let text = "名稱,地址,電話,類別\n,新北市1號,,";
        let parsed = RecordParser::new().parse(text);
        let record = &parsed.records[0];
        assert_eq!(record.name, UNKNOWN_NAME);
        assert_eq!(record.phone, UNKNOWN_PHONE);
        assert_eq!(record.category, Category::Foundation);
    }

    #[test]
    fn test_positional_fallback_without_headers() {
        let text = "編號,單位,位置,號碼,備註\n7,'里辦公室',高雄市1號,07-1,里辦\n";
        let parsed = RecordParser::new().parse(text);
        let record = &parsed.records[0];
        assert_eq!(record.id, 1);
        assert_eq!(record.name, "里辦公室");
        assert_eq!(record.address, "高雄市1號");
        assert_eq!(record.phone, "07-1");
        assert_eq!(record.category, Category::Chief);
    }

    #[test]
    fn test_crlf_line_endings() {
        let parsed = RecordParser::new().parse("Name,Address,Phone,Category\r\nX,Taipei 1,02,church\r\n");
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].category, Category::Church);
        assert_eq!(parsed.records[0].address, "Taipei 1");
    }

    #[test]
    fn test_quoted_commas_are_not_special() {
        let text = "名稱,地址,電話,類別\n\"平安,基金會\",台中市1號,04,基金會\n";
        let parsed = RecordParser::new().parse(text);
        let record = &parsed.records[0];
        assert_eq!(record.name, "平安");
        assert_eq!(record.address, "基金會");
        assert_eq!(record.phone, "台中市1號");
    }

    #[test]
    fn test_empty_text_yields_no_records() {
        let parsed = RecordParser::new().parse("");
        assert!(parsed.records.is_empty());
        assert!(parsed.mapping.is_none());
        assert!(parsed.state.has_warnings());
    }

    #[test]
    fn test_accepted_rows_are_well_formed() {
        let text = "名稱,地址,電話,類別\nA,地1,1,鎖匠\nB\nC,地3\nD,,4,x\nE,地5,5,教堂";
        let parsed = RecordParser::new().parse(text);
        for record in &parsed.records {
            let line = text.split('\n').nth(record.id).unwrap();
            assert!(line.split(',').count() >= MIN_FIELDS);
            assert!(!record.address.is_empty());
        }
        assert_eq!(parsed.records.len(), 2);
    }
}
