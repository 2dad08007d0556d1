use anyhow::Result;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use issuance_lib::{DateRange, Report};

use crate::output::{report_table, ReportTable};

const PRINT_STYLE: &str = "body { font-family: sans-serif; margin: 2em; } \
table { border-collapse: collapse; width: 100%; } \
th, td { border: 1px solid #999; padding: 4px 8px; text-align: start; } \
thead th { background: #eee; } \
tfoot td { font-weight: bold; } \
@media print { body { margin: 0; } }";

fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    tag: &str,
    text: &str,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_row<W: std::io::Write>(
    writer: &mut Writer<W>,
    cell_tag: &str,
    cells: &[String],
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("tr")))?;
    for cell in cells {
        write_text_element(writer, cell_tag, cell)?;
    }
    writer.write_event(Event::End(BytesEnd::new("tr")))?;
    Ok(())
}

fn write_table<W: std::io::Write>(writer: &mut Writer<W>, table: &ReportTable) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("table")))?;

    writer.write_event(Event::Start(BytesStart::new("thead")))?;
    write_row(writer, "th", &table.header)?;
    writer.write_event(Event::End(BytesEnd::new("thead")))?;

    writer.write_event(Event::Start(BytesStart::new("tbody")))?;
    for row in &table.rows {
        write_row(writer, "td", row)?;
    }
    writer.write_event(Event::End(BytesEnd::new("tbody")))?;

    if let Some(footer) = &table.footer {
        writer.write_event(Event::Start(BytesStart::new("tfoot")))?;
        write_row(writer, "td", footer)?;
        writer.write_event(Event::End(BytesEnd::new("tfoot")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("table")))?;
    Ok(())
}

/// Static, printable HTML snapshot of a report: right-to-left, UTF-8.
pub fn report_to_html(report: &Report<'_>, range: &DateRange) -> Result<String> {
    let title = report.title();
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::DocType(BytesText::from_escaped("html")))?;
    writer.write_event(Event::Start(
        BytesStart::new("html").with_attributes([("dir", "rtl"), ("lang", "ar")]),
    ))?;

    writer.write_event(Event::Start(BytesStart::new("head")))?;
    writer.write_event(Event::Empty(
        BytesStart::new("meta").with_attributes([("charset", "UTF-8")]),
    ))?;
    write_text_element(&mut writer, "title", &title)?;
    write_text_element(&mut writer, "style", PRINT_STYLE)?;
    writer.write_event(Event::End(BytesEnd::new("head")))?;

    writer.write_event(Event::Start(BytesStart::new("body")))?;
    write_text_element(&mut writer, "h1", &title)?;
    writer.write_event(Event::Start(
        BytesStart::new("p").with_attributes([("class", "range")]),
    ))?;
    writer.write_event(Event::Text(BytesText::new(&range.to_string())))?;
    writer.write_event(Event::End(BytesEnd::new("p")))?;
    write_table(&mut writer, &report_table(report))?;
    writer.write_event(Event::End(BytesEnd::new("body")))?;

    writer.write_event(Event::End(BytesEnd::new("html")))?;

    let buf = writer.into_inner().into_inner();
    Ok(String::from_utf8(buf)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use issuance_lib::types::{Party, PaymentRecord, Reference};
    use issuance_lib::{run_report, VehicleIndex};

    fn march() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
    }

    fn payments() -> Vec<PaymentRecord> {
        vec![
            PaymentRecord {
                amount: Some(1000.0),
                insurance_company: Some(Reference::Embedded(Party::new("c1", "Smith & <Sons>"))),
                ..PaymentRecord::new("a")
            },
            PaymentRecord {
                amount: Some(250.0),
                insurance_company: Some(Reference::Embedded(Party::new("c2", "الشركة"))),
                ..PaymentRecord::new("b")
            },
        ]
    }

    #[test]
    fn test_html_document_shape() {
        let data = payments();
        let report = run_report("by-company", &data, &VehicleIndex::new());
        let html = report_to_html(&report, &march()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html dir="rtl" lang="ar">"#));
        assert!(html.contains(r#"<meta charset="UTF-8"/>"#));
        assert!(html.contains("<title>Payments by insurance company</title>"));
        assert!(html.contains("<th>Insurance Company</th>"));
        assert!(html.contains("<td>الشركة</td>"));
        assert!(html.contains("<tfoot>"));
        assert!(html.contains("<td>1,250</td>"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_html_escapes_text() {
        let data = payments();
        let report = run_report("by-company", &data, &VehicleIndex::new());
        let html = report_to_html(&report, &march()).unwrap();
        assert!(html.contains("Smith &amp; &lt;Sons&gt;"));
        assert!(!html.contains("<Sons>"));
    }

    #[test]
    fn test_html_listing_has_no_footer() {
        let data = payments();
        let report = run_report("not-a-report", &data, &VehicleIndex::new());
        let html = report_to_html(&report, &march()).unwrap();
        assert!(html.contains("<th>Employee</th>"));
        assert!(!html.contains("<tfoot>"));
    }
}
