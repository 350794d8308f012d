//! Server-rendered HTML.
//!
//! Pages are assembled with `format!`; every piece of user text goes through
//! [`esc`] first.

use std::{borrow::Cow, fmt::Write as _};

use lineage_core::person::{Gender, PersonRecord};
use quick_xml::escape::escape;
use strum::IntoEnumIterator as _;

use crate::ServerConfig;

fn esc(s: &str) -> Cow<'_, str> { escape(s) }

const STYLE: &str = "\
body{margin:0;font-family:system-ui,sans-serif;display:flex;min-height:100vh}\
aside{width:18rem;padding:1rem;background:#f4f4f4;box-sizing:border-box}\
aside label{display:block;margin-top:.6rem;font-size:.9rem}\
aside input,aside select,aside textarea{width:100%;box-sizing:border-box}\
main{flex:1;padding:1rem;overflow:auto}\
.notice{padding:.6rem;border-radius:4px;background:#e6f4ea}\
.info{padding:.6rem;border-radius:4px;background:#e8f0fe}\
.error{color:#b00020}\
main img{max-width:100%}";

fn layout(title: &str, body: &str) -> String {
  format!(
    "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
     <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
     <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
    title = esc(title),
  )
}

// ─── Login ───────────────────────────────────────────────────────────────────

/// The password form, optionally with an error from the previous attempt.
pub fn login(title: &str, error: Option<&str>) -> String {
  let error = error
    .map(|e| format!("<p class=\"error\">{}</p>\n", esc(e)))
    .unwrap_or_default();
  let body = format!(
    "<main>\n<h1>{title}</h1>\n{error}\
     <form method=\"post\" action=\"/login\">\n\
     <label>Password <input type=\"password\" name=\"password\" autofocus required></label>\n\
     <button type=\"submit\">Enter</button>\n\
     </form>\n</main>\n",
    title = esc(title),
  );
  layout(title, &body)
}

// ─── Tree ────────────────────────────────────────────────────────────────────

/// The ingestion sidebar plus either the chart or the empty-state message.
pub fn tree(config: &ServerConfig, records: &[PersonRecord], notice: Option<&str>) -> String {
  let mut body = String::new();
  body.push_str(&sidebar(config, records));

  body.push_str("<main>\n");
  let _ = writeln!(body, "<h1>{}</h1>", esc(&config.title));
  if let Some(notice) = notice {
    let _ = writeln!(body, "<p class=\"notice\">{}</p>", esc(notice));
  }
  if records.is_empty() {
    body.push_str(
      "<p class=\"info\">No one has been added yet. Use the form on the left to add the \
       first person.</p>\n",
    );
  } else {
    let _ = writeln!(
      body,
      "<p><img src=\"/chart.png\" alt=\"Family chart of {} people\"></p>\n\
       <p><a href=\"/chart.svg\">SVG</a> · <a href=\"/chart.dot\">DOT</a></p>",
      records.len()
    );
  }
  body.push_str("</main>\n");

  layout(&config.title, &body)
}

fn sidebar(config: &ServerConfig, records: &[PersonRecord]) -> String {
  let mut html = String::from(
    "<aside>\n<h2>Add a person</h2>\n\
     <form method=\"post\" action=\"/people\" enctype=\"multipart/form-data\">\n\
     <label>Name <input type=\"text\" name=\"name\" required></label>\n",
  );

  html.push_str("<label>Gender <select name=\"gender\">\n");
  for gender in Gender::iter() {
    let _ = writeln!(html, "<option value=\"{gender}\">{}</option>", gender_label(gender));
  }
  html.push_str("</select></label>\n");

  let _ = writeln!(
    html,
    "<label>Birth year <input type=\"number\" name=\"birth_year\" min=\"{}\" max=\"{}\" \
     value=\"{}\"></label>",
    config.birth_year_min,
    config.birth_year_max,
    config.initial_birth_year(),
  );

  html.push_str(&picker("parent", "Parent", records));
  html.push_str(&picker("spouse", "Spouse", records));

  html.push_str(
    "<label>Photo <input type=\"file\" name=\"photo\" accept=\"image/png,image/jpeg\"></label>\n\
     <label>Biography <textarea name=\"bio\" rows=\"4\"></textarea></label>\n\
     <p><button type=\"submit\">Save</button></p>\n\
     </form>\n\
     <form method=\"post\" action=\"/logout\"><button type=\"submit\">Log out</button></form>\n\
     </aside>\n",
  );
  html
}

/// A `<select>` over every existing record, led by a "none" choice.
fn picker(name: &str, label: &str, records: &[PersonRecord]) -> String {
  let mut html = format!("<label>{label} <select name=\"{name}\">\n<option value=\"\">None</option>\n");
  for record in records {
    let text = record.picker_label();
    let _ = writeln!(html, "<option value=\"{}\">{}</option>", record.id, esc(&text));
  }
  html.push_str("</select></label>\n");
  html
}

fn gender_label(gender: Gender) -> &'static str {
  match gender {
    Gender::Male => "Male",
    Gender::Female => "Female",
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use lineage_core::person::{NewPerson, PersonId};

  use super::*;

  fn config() -> ServerConfig { ServerConfig::with_password_hash("x") }

  #[test]
  fn login_escapes_error_text() {
    let html = login("Tree", Some("<bad>"));
    assert!(html.contains("&lt;bad&gt;"));
    assert!(html.contains("type=\"password\""));
  }

  #[test]
  fn empty_tree_has_no_chart() {
    let html = tree(&config(), &[], None);
    assert!(html.contains("No one has been added yet"));
    assert!(!html.contains("<img"));
    assert!(html.contains("<option value=\"\">None</option>"));
    assert!(html.contains("value=\"1370\""));
  }

  #[test]
  fn pickers_list_every_record() {
    let records: Vec<_> = ["Ali", "Sara & Co"]
      .into_iter()
      .enumerate()
      .map(|(i, name)| {
        PersonRecord::from_new(
          PersonId(i as u64 + 1),
          NewPerson::new(name, Gender::Female, 1360),
          Utc::now(),
        )
      })
      .collect();

    let html = tree(&config(), &records, Some("Added Sara."));
    assert_eq!(html.matches("<option value=\"2\">2-Sara &amp; Co</option>").count(), 2);
    assert!(html.contains("<option value=\"1\">1-Ali</option>"));
    assert!(html.contains("<option value=\"female\">Female</option>"));
    assert!(html.contains("Added Sara."));
    assert!(html.contains("src=\"/chart.png\""));
    assert!(html.contains("href=\"/chart.svg\""));
  }
}
