use scanner_core::{AppViewModel, BookRecord, Message, MessageKind};

const NO_IMAGE: &str = "no image";

/// Plain-text rendering of the whole screen.
pub fn render(view: &AppViewModel, at: &str) -> String {
    let mut lines = vec![status_line(view, at)];
    if let Some(message) = &view.message {
        lines.push(message_line(message));
    }
    if view.catalog_len > 0 {
        lines.push(format!("Scanned books ({})", view.catalog_len));
        lines.extend(
            view.catalog
                .iter()
                .enumerate()
                .map(|(index, record)| format_book_row(index + 1, record)),
        );
    }
    lines.join("\n")
}

fn status_line(view: &AppViewModel, at: &str) -> String {
    let session = if view.running { "Scanning" } else { "Stopped" };
    let mut parts = vec![format!("[{at}] {session}")];
    if let Some(code) = &view.last_code {
        parts.push(format!("Barcode: {code}"));
    }
    if view.loading {
        parts.push("Loading...".to_string());
    }
    parts.push(format!("Books: {}", view.catalog_len));
    parts.join(" | ")
}

fn message_line(message: &Message) -> String {
    let tag = match message.kind {
        MessageKind::Success => "OK",
        MessageKind::Error => "ERR",
    };
    format!("  {tag}: {}", message.text)
}

fn format_book_row(index: usize, record: &BookRecord) -> String {
    let title = record.title.as_deref().unwrap_or("(untitled)");
    let mut fields = vec![
        format!("ISBN {}", record.isbn),
        format!("authors: {}", authors_label(&record.authors)),
    ];
    if let Some(date) = &record.published_date {
        fields.push(format!("published: {date}"));
    }
    if let Some(pages) = record.page_count {
        fields.push(format!("pages: {pages}"));
    }
    fields.push(format!(
        "cover: {}",
        record.thumbnail.as_deref().unwrap_or(NO_IMAGE)
    ));
    if let Some(link) = &record.info_link {
        fields.push(format!("info: {link}"));
    }
    format!("  #{index} {title}\n      {}", fields.join("; "))
}

fn authors_label(authors: &[String]) -> String {
    if authors.is_empty() {
        "unknown".to_string()
    } else {
        authors.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(thumbnail: Option<&str>) -> BookRecord {
        BookRecord {
            isbn: "9784000000000".to_string(),
            title: Some("Title".to_string()),
            authors: vec!["A".to_string(), "B".to_string()],
            published_date: Some("2020-01-01".to_string()),
            page_count: Some(120),
            thumbnail: thumbnail.map(str::to_string),
            info_link: Some("http://books.example/info".to_string()),
        }
    }

    #[test]
    fn idle_screen_is_a_status_line() {
        let view = AppViewModel::default();
        assert_eq!(render(&view, "10:00:00"), "[10:00:00] Stopped | Books: 0");
    }

    #[test]
    fn running_screen_shows_code_loading_and_message() {
        let view = AppViewModel {
            running: true,
            loading: true,
            last_code: Some("9784000000000".to_string()),
            message: Some(Message {
                text: "No book found for ISBN 9784000000000".to_string(),
                kind: MessageKind::Error,
            }),
            ..AppViewModel::default()
        };
        let screen = render(&view, "10:00:00");
        let lines: Vec<_> = screen.lines().collect();
        assert_eq!(
            lines[0],
            "[10:00:00] Scanning | Barcode: 9784000000000 | Loading... | Books: 0"
        );
        assert_eq!(lines[1], "  ERR: No book found for ISBN 9784000000000");
    }

    #[test]
    fn book_rows_render_every_field() {
        let view = AppViewModel {
            catalog: vec![book(Some("http://books.example/t.jpg"))],
            catalog_len: 1,
            ..AppViewModel::default()
        };
        let screen = render(&view, "t");
        assert!(screen.contains("Scanned books (1)"));
        assert!(screen.contains("  #1 Title"));
        assert!(screen.contains("authors: A,B"));
        assert!(screen.contains("published: 2020-01-01"));
        assert!(screen.contains("pages: 120"));
        assert!(screen.contains("cover: http://books.example/t.jpg"));
        assert!(screen.contains("info: http://books.example/info"));
    }

    #[test]
    fn missing_thumbnail_says_no_image() {
        let view = AppViewModel {
            catalog: vec![book(None)],
            catalog_len: 1,
            ..AppViewModel::default()
        };
        assert!(render(&view, "t").contains("cover: no image"));
    }
}
