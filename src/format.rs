use crate::category::Category;
use crate::models::Record;
use crate::store::Workbook;

/// One `Label: value` line per schema field, in schema order.
pub fn format_record(category: Category, record: &Record) -> String {
    category
        .schema()
        .fields
        .iter()
        .map(|field| format!("{}: {}", field.label, record.value(field.key)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_category(category: Category, records: &[Record], numbered: bool) -> String {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let block = format_record(category, record);
            if numbered {
                format!("{}.\n{block}", index + 1)
            } else {
                block
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Every non-empty category under its `[Header]`, in catalogue order.
pub fn format_all(workbook: &Workbook) -> String {
    let sections: Vec<String> = Category::ALL
        .into_iter()
        .filter_map(|category| {
            let records = workbook.records(category);
            if records.is_empty() {
                return None;
            }
            let body = format_category(category, records, records.len() > 1);
            Some(format!("[{}]\n{body}", category.header()))
        })
        .collect();

    sections.join("\n\n").trim_end().to_string()
}
