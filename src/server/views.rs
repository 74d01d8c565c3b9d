//! Server-rendered HTML pages.

use crate::library::form::{BookForm, Field, ValidationErrors};
use crate::library::month::{format_month_label, month_options};
use crate::library::{Book, MonthNeighbours, Rating};
use chrono::NaiveDate;
use quick_xml::escape::escape;
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; background: #f9fafb; color: #111827; margin: 0; }
main { max-width: 72rem; margin: 0 auto; padding: 3rem 1.5rem; }
a { color: inherit; }
header { display: flex; justify-content: space-between; align-items: baseline; margin-bottom: 2rem; }
h1 { font-weight: 300; font-size: 2.5rem; margin: 0; }
.button { background: #111827; color: #fff; padding: 0.75rem 1.5rem; text-decoration: none; text-transform: uppercase; letter-spacing: 0.05em; font-size: 0.8rem; border: 0; cursor: pointer; }
.months { display: flex; flex-wrap: wrap; gap: 0.5rem; margin-bottom: 2rem; }
.months a { padding: 0.4rem 0.9rem; border: 1px solid #d1d5db; text-decoration: none; font-size: 0.85rem; }
.months a.selected { background: #111827; color: #fff; border-color: #111827; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(12rem, 1fr)); gap: 1.5rem; }
.card { display: block; text-decoration: none; background: #fff; box-shadow: 0 1px 3px rgba(0,0,0,.1); }
.card img { width: 100%; aspect-ratio: 2 / 3; object-fit: cover; display: block; }
.card .meta { padding: 0.75rem; }
.card .title { font-weight: 600; }
.card .author, .muted { color: #6b7280; font-size: 0.9rem; }
.stars { letter-spacing: 0.1em; }
.empty { text-align: center; padding: 4rem 0; color: #6b7280; }
.detail { display: grid; grid-template-columns: 1fr 2fr; gap: 3rem; background: #fff; padding: 2rem; position: relative; }
.detail img.cover { width: 100%; }
.watermark { position: absolute; right: 2rem; top: 1rem; font-size: 4rem; color: #f3f4f6; font-weight: 700; }
.author-photo { width: 8rem; height: 8rem; object-fit: cover; border-radius: 50%; }
.nav { display: flex; justify-content: space-between; align-items: center; margin-top: 2rem; }
.disabled { color: #d1d5db; }
form .field { margin-bottom: 1.5rem; }
form label { display: block; text-transform: uppercase; letter-spacing: 0.05em; font-size: 0.8rem; margin-bottom: 0.5rem; }
form input[type=text], form input[type=number], form select, form textarea { width: 100%; padding: 0.6rem; font-size: 1rem; border: 1px solid #d1d5db; box-sizing: border-box; }
form .invalid { border-color: #ef4444; }
.error { color: #dc2626; font-size: 0.85rem; margin-top: 0.4rem; }
"#;

fn layout(site_title: &str, page_title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{page} · {site}</title>
    <style>{style}</style>
</head>
<body>
<main>
{body}
</main>
</body>
</html>"#,
        page = escape(page_title),
        site = escape(site_title),
        style = STYLE,
        body = body,
    )
}

fn stars(rating: Rating) -> String {
    format!(
        r#"<span class="stars" title="{value} of 5">{stars}</span>"#,
        value = rating.value(),
        stars = rating.stars(),
    )
}

fn month_href(month: &str) -> String {
    format!("/?month={}", urlencoding::encode(month))
}

/// Gallery of one month (or of everything when no month is selected).
pub fn gallery_page(
    site_title: &str,
    months: &[String],
    selected: Option<&str>,
    books: &[Book],
) -> String {
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<header><h1>{title}</h1><a class="button" href="/books/new">Add Book</a></header>"#,
        title = escape(site_title),
    );

    if !months.is_empty() {
        body.push_str(r#"<nav class="months">"#);
        for month in months {
            let class = if Some(month.as_str()) == selected {
                "selected"
            } else {
                ""
            };
            let _ = write!(
                body,
                r#"<a class="{class}" href="{href}">{label}</a>"#,
                class = class,
                href = escape(&month_href(month)),
                label = escape(&format_month_label(month)),
            );
        }
        body.push_str("</nav>");
    }

    if books.is_empty() {
        body.push_str(
            r#"<div class="empty"><p>No books recorded yet.</p><p><a href="/books/new">Add your first book</a></p></div>"#,
        );
    } else {
        body.push_str(r#"<section class="grid">"#);
        for book in books {
            body.push_str(&book_card(book));
        }
        body.push_str("</section>");
    }

    let page_title = selected
        .map(format_month_label)
        .unwrap_or_else(|| "Gallery".to_string());
    layout(site_title, &page_title, &body)
}

fn book_card(book: &Book) -> String {
    format!(
        r#"<a class="card" href="/books/{id}">
<img src="{cover}" alt="Cover of {title}" loading="lazy">
<div class="meta">
<div class="title">{title}</div>
<div class="author">{author}</div>
<div>{stars} <span class="muted">{label}</span></div>
</div>
</a>"#,
        id = urlencoding::encode(&book.id),
        cover = escape(&book.cover_image),
        title = escape(&book.title),
        author = escape(&book.author),
        stars = stars(book.rating),
        label = book.rating.label(),
    )
}

/// Detail page with navigation inside the book's month.
pub fn detail_page(site_title: &str, book: &Book, position: Option<&MonthNeighbours>) -> String {
    let month_label = format_month_label(&book.month_year);
    let mut body = String::new();

    body.push_str(r#"<p><a href="/">&larr; Back to Gallery</a></p>"#);
    body.push_str(r#"<article class="detail">"#);

    let _ = write!(
        body,
        r#"<div><img class="cover" src="{cover}" alt="Cover of {title}"></div><div>"#,
        cover = escape(&book.cover_image),
        title = escape(&book.title),
    );

    if let Some(year) = book.publication_year {
        let _ = write!(body, r#"<div class="watermark">{}</div>"#, year);
    }

    let _ = write!(
        body,
        r#"<h1>{title}</h1><p class="muted">{author}</p><p>{stars} <span class="muted">{month}</span></p>"#,
        title = escape(&book.title),
        author = escape(&book.author),
        stars = stars(book.rating),
        month = escape(&month_label),
    );

    let _ = write!(
        body,
        "<h2>Synopsis</h2><p>{}</p>",
        escape(&book.synopsis).replace('\n', "<br>"),
    );

    if let Some(photo) = &book.author_photo {
        let _ = write!(
            body,
            r#"<h3>About the Author</h3><img class="author-photo" src="{photo}" alt="{author}">"#,
            photo = escape(photo),
            author = escape(&book.author),
        );
    }

    body.push_str("</div></article>");

    if let Some(position) = position.filter(|p| p.total > 1) {
        let _ = write!(
            body,
            r#"<div class="nav"><span class="muted">{n} of {total} from {month}</span><span>"#,
            n = position.index + 1,
            total = position.total,
            month = escape(&month_label),
        );
        body.push_str(&nav_link(position.previous.as_ref(), "Previous"));
        body.push_str(" &middot; ");
        body.push_str(&nav_link(position.next.as_ref(), "Next"));
        body.push_str("</span></div>");
    }

    layout(site_title, &book.title, &body)
}

fn nav_link(target: Option<&Book>, label: &str) -> String {
    match target {
        Some(book) => format!(
            r#"<a href="/books/{id}">{label}</a>"#,
            id = urlencoding::encode(&book.id),
            label = label,
        ),
        None => format!(r#"<span class="disabled">{}</span>"#, label),
    }
}

/// Add-book form, re-rendered with the user's input and per-field errors.
pub fn add_form_page(
    site_title: &str,
    form: &BookForm,
    errors: &ValidationErrors,
    today: NaiveDate,
) -> String {
    let mut body = String::new();

    body.push_str(r#"<p><a href="/">&larr; Back to Gallery</a></p>"#);
    body.push_str(r#"<h1>Add New Book</h1><p class="muted">Document your latest read</p>"#);
    body.push_str(r#"<form method="post" action="/books" enctype="multipart/form-data">"#);

    body.push_str(&text_input("Title *", Field::Title, &form.title, "Enter book title", errors));
    body.push_str(&text_input(
        "Author *",
        Field::Author,
        &form.author,
        "Enter author name",
        errors,
    ));

    let _ = write!(
        body,
        r#"<div class="field"><label for="publicationYear">Publication Year</label><input type="number" id="publicationYear" name="publicationYear" value="{value}" min="1000" max="{max}" placeholder="e.g. 2023"{class}>{error}</div>"#,
        value = escape(&form.publication_year),
        max = chrono::Datelike::year(&today),
        class = invalid_class(errors, Field::PublicationYear),
        error = field_error(errors, Field::PublicationYear),
    );

    let _ = write!(
        body,
        r#"<div class="field"><label for="monthYear">Month of Reading *</label><select id="monthYear" name="monthYear"{class}><option value="">Select month</option>"#,
        class = invalid_class(errors, Field::MonthYear),
    );
    let selected_month = crate::library::month::normalize_month(&form.month_year);
    for (value, label) in month_options(today) {
        let selected = if selected_month.as_deref() == Some(value.as_str()) {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            body,
            r#"<option value="{value}"{selected}>{label}</option>"#,
            value = value,
            selected = selected,
            label = label,
        );
    }
    let _ = write!(body, "</select>{}</div>", field_error(errors, Field::MonthYear));

    body.push_str(r#"<div class="field"><label>Rating *</label>"#);
    for value in Rating::MIN..=Rating::MAX {
        let checked = if form.rating.trim() == value.to_string() {
            " checked"
        } else {
            ""
        };
        let _ = write!(
            body,
            r#"<label style="display:inline;margin-right:1rem"><input type="radio" name="rating" value="{value}"{checked}> {value} star{plural}</label>"#,
            value = value,
            checked = checked,
            plural = if value == 1 { "" } else { "s" },
        );
    }
    let _ = write!(body, "{}</div>", field_error(errors, Field::Rating));

    let _ = write!(
        body,
        r#"<div class="field"><label for="synopsis">Synopsis *</label><textarea id="synopsis" name="synopsis" rows="6" placeholder="Write a brief synopsis of the book..."{class}>{value}</textarea>{error}</div>"#,
        value = escape(&form.synopsis),
        class = invalid_class(errors, Field::Synopsis),
        error = field_error(errors, Field::Synopsis),
    );

    let _ = write!(
        body,
        r#"<div class="field"><label for="coverImage">Book Cover</label><input type="file" id="coverImage" name="coverImage" accept="image/*"><p class="muted">Leave empty and we'll generate one for you.</p>{error}</div>"#,
        error = field_error(errors, Field::CoverImage),
    );

    body.push_str(
        r#"<div class="field"><label for="authorPhoto">Author Photo</label><input type="file" id="authorPhoto" name="authorPhoto" accept="image/*"></div>"#,
    );

    body.push_str(
        r#"<p><button class="button" type="submit">Add Book to Collection</button> <a href="/">Cancel</a></p></form>"#,
    );

    layout(site_title, "Add New Book", &body)
}

fn text_input(
    label: &str,
    field: Field,
    value: &str,
    placeholder: &str,
    errors: &ValidationErrors,
) -> String {
    format!(
        r#"<div class="field"><label for="{name}">{label}</label><input type="text" id="{name}" name="{name}" value="{value}" placeholder="{placeholder}"{class}>{error}</div>"#,
        name = field.as_str(),
        label = label,
        value = escape(value),
        placeholder = placeholder,
        class = invalid_class(errors, field),
        error = field_error(errors, field),
    )
}

fn invalid_class(errors: &ValidationErrors, field: Field) -> &'static str {
    if errors.get(field).is_some() {
        r#" class="invalid""#
    } else {
        ""
    }
}

fn field_error(errors: &ValidationErrors, field: Field) -> String {
    errors
        .get(field)
        .map(|msg| format!(r#"<p class="error">{}</p>"#, escape(msg)))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, title: &str) -> Book {
        Book {
            id: id.to_string(),
            title: title.to_string(),
            author: "Author".to_string(),
            cover_image: "data:image/png;base64,AA==".to_string(),
            month_year: "2024-03-01".to_string(),
            rating: Rating::new(3).unwrap(),
            synopsis: "Line one\nLine two".to_string(),
            author_photo: None,
            publication_year: Some(1999),
            date_added: "2024-03-02T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_gallery_escapes_user_text() {
        let books = vec![book("1", "<script>alert(1)</script>")];
        let months = vec!["2024-03-01".to_string()];
        let html = gallery_page("Leio", &months, Some("2024-03-01"), &books);
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("March 2024"));
        assert!(html.contains("Good Read"));
    }

    #[test]
    fn test_gallery_empty_state() {
        let html = gallery_page("Leio", &[], None, &[]);
        assert!(html.contains("No books recorded yet."));
        assert!(html.contains("/books/new"));
    }

    #[test]
    fn test_detail_navigation() {
        let current = book("2", "Second");
        let position = MonthNeighbours {
            index: 1,
            total: 3,
            previous: Some(book("1", "First")),
            next: None,
        };
        let html = detail_page("Leio", &current, Some(&position));
        assert!(html.contains("2 of 3 from March 2024"));
        assert!(html.contains(r#"<a href="/books/1">Previous</a>"#));
        assert!(html.contains(r#"<span class="disabled">Next</span>"#));
        assert!(html.contains("Line one<br>Line two"));
        assert!(html.contains("1999"));
    }

    #[test]
    fn test_form_shows_errors_and_keeps_input() {
        let form = BookForm {
            title: "Kept \"title\"".to_string(),
            month_year: "2024-03-01".to_string(),
            ..BookForm::default()
        };
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let errors = form.validate(today).unwrap_err();
        let html = add_form_page("Leio", &form, &errors, today);

        assert!(html.contains("Kept &quot;title&quot;"));
        assert!(html.contains("Author is required"));
        assert!(html.contains(r#"<option value="2024-03-01" selected>March 2024</option>"#));
        assert!(html.contains(r#"value="5" checked"#));
    }
}
