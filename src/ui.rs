use crate::category::{Category, FieldInput, FieldSpec};
use crate::form::{FormBoard, FormController, FormMode};
use crate::models::Record;
use crate::store::Workbook;
use std::fmt::Write;

/// Hidden form input carrying the id the page was editing, blank when creating.
pub const EDITING_FIELD: &str = "editing";

const FEEDBACK_URL: &str = "https://docs.google.com/forms/d/e/1FAIpQLSdYGk6x85Pj45U4aF9JD2JA5z5cSI-O5Xhni9XQnXCtNWaQ5A/viewform?usp=sharing&ouid=117938457471446645645";

pub struct IndexView<'a> {
    pub workbook: &'a Workbook,
    pub forms: &'a FormBoard,
    pub load_notice: Option<&'a str>,
}

pub fn render_index(view: &IndexView<'_>) -> String {
    let notice = view
        .load_notice
        .map(|message| format!(r#"<p class="notice">{}</p>"#, escape(message)))
        .unwrap_or_default();

    let nav: String = Category::ALL
        .into_iter()
        .map(|category| {
            format!(
                r##"<a href="#{}">{}</a>"##,
                category.slug(),
                escape(category.header())
            )
        })
        .collect();

    let sections: String = Category::ALL
        .into_iter()
        .map(|category| {
            render_section(
                category,
                view.forms.get(category),
                view.workbook.records(category),
            )
        })
        .collect();

    INDEX_HTML
        .replace("{{NOTICE}}", &notice)
        .replace("{{NAV}}", &nav)
        .replace("{{TOTAL}}", &view.workbook.len().to_string())
        .replace("{{FEEDBACK_URL}}", &escape(FEEDBACK_URL))
        .replace("{{SECTIONS}}", &sections)
}

fn render_section(category: Category, form: &FormController, records: &[Record]) -> String {
    let slug = category.slug();
    let header = escape(category.header());
    let (editing, target) = match form.mode() {
        FormMode::Editing(id) => (true, escape(id)),
        FormMode::Creating => (false, String::new()),
    };
    let mut html = String::new();

    let _ = write!(
        html,
        r#"<section class="card" id="{slug}">
      <h2>{header} {title}</h2>
      <form class="entry" method="post" action="/forms/{slug}/submit">
        <input type="hidden" name="{EDITING_FIELD}" value="{target}" />
        <div class="fields">"#,
        title = if editing { "수정" } else { "추가" },
    );
    for field in category.schema().fields {
        let value = form.draft().get(field.key).map(String::as_str).unwrap_or("");
        html.push_str(&render_input(slug, field, value));
    }
    let _ = write!(
        html,
        r#"</div>
        <div class="row">
          <button class="primary" type="submit">{submit}</button>"#,
        submit = if editing { "수정" } else { "저장" },
    );
    if editing {
        let _ = write!(
            html,
            r#"<button class="ghost" type="submit" formaction="/forms/{slug}/cancel">취소</button>"#
        );
    }
    html.push_str("</div>\n      </form>");

    let _ = write!(
        html,
        r#"
      <div class="saved-head">
        <h3>저장된 {header} ({count}개)</h3>
        <button class="ghost" type="button" data-copy="/api/copy/{slug}">섹션 복사</button>
      </div>"#,
        count = records.len(),
    );
    for record in records {
        html.push_str(&render_record(category, record));
    }
    html.push_str("\n    </section>\n");
    html
}

fn render_input(slug: &str, field: &FieldSpec, value: &str) -> String {
    let key = field.key;
    let label = escape(field.label);
    let placeholder = escape(field.placeholder);
    let control = match field.input {
        FieldInput::Text => format!(
            r#"<input id="{slug}-{key}" name="{key}" value="{}" placeholder="{placeholder}" />"#,
            escape(value)
        ),
        FieldInput::TextArea => format!(
            r#"<textarea id="{slug}-{key}" name="{key}" rows="3" placeholder="{placeholder}">{}</textarea>"#,
            escape(value)
        ),
        FieldInput::Select(options) => {
            let mut html = format!(r#"<select id="{slug}-{key}" name="{key}"><option value="">{placeholder}</option>"#);
            let known = options.iter().any(|option| *option == value);
            if !known && !value.is_empty() {
                let _ = write!(html, r#"<option selected>{}</option>"#, escape(value));
            }
            for option in options {
                let selected = if *option == value { " selected" } else { "" };
                let _ = write!(html, r#"<option{selected}>{}</option>"#, escape(option));
            }
            html.push_str("</select>");
            html
        }
    };
    let wide = if field.input == FieldInput::TextArea { " wide" } else { "" };
    format!(r#"<label class="field{wide}"><span>{label}</span>{control}</label>"#)
}

fn render_record(category: Category, record: &Record) -> String {
    let slug = category.slug();
    let id = encode_segment(&record.id);
    let fields = category.schema().fields;
    let title = fields
        .first()
        .map(|field| escape(record.value(field.key)))
        .unwrap_or_default();

    let mut html = format!(
        r#"
      <article class="record">
        <div class="record-head">
          <strong>{title}</strong>
          <div class="row">
            <button class="ghost" type="button" data-copy="/api/copy/{slug}/{id}">복사</button>
            <form method="post" action="/forms/{slug}/edit/{id}"><button class="ghost" type="submit">수정</button></form>
            <form method="post" action="/forms/{slug}/delete/{id}"><button class="danger" type="submit">삭제</button></form>
          </div>
        </div>
        <dl>"#
    );
    for field in fields {
        let _ = write!(
            html,
            r#"<div><dt>{label}</dt><dd>{value}</dd><button class="mini" type="button" data-copy="/api/copy/{slug}/{id}/{key}">복사</button></div>"#,
            label = escape(field.label),
            value = escape(record.value(field.key)),
            key = field.key,
        );
    }
    html.push_str("</dl>\n      </article>");
    html
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Percent-encodes everything outside the URL unreserved set.
fn encode_segment(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(byte as char);
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="ko">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>채용 지원서 관리 시스템</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Pretendard", "Apple SD Gothic Neo", "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: flex-end;
      justify-content: space-between;
      gap: 12px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
    }

    .subtitle {
      margin: 6px 0 0;
      color: #5f5c57;
    }

    .visitors {
      background: white;
      border-radius: 999px;
      padding: 8px 14px;
      font-size: 0.9rem;
      box-shadow: 0 8px 16px rgba(47, 72, 88, 0.12);
    }

    .visitors strong {
      color: var(--accent-2);
    }

    .badge {
      margin-left: 6px;
      font-size: 0.75rem;
      background: #d8f3dc;
      color: #2d7a4b;
      border-radius: 999px;
      padding: 2px 8px;
    }

    .notice {
      margin: 0;
      padding: 12px 16px;
      border-radius: 14px;
      background: #fde2dd;
      color: #c63b2b;
    }

    nav {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
    }

    nav a {
      color: var(--accent-2);
      text-decoration: none;
      font-size: 0.9rem;
      padding: 6px 12px;
      border-radius: 999px;
      background: rgba(47, 72, 88, 0.08);
    }

    .card {
      background: var(--card);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 28px;
      display: grid;
      gap: 16px;
    }

    .card h2,
    .card h3 {
      margin: 0;
    }

    .fields {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(240px, 1fr));
      gap: 12px;
    }

    .field {
      display: grid;
      gap: 6px;
      font-size: 0.9rem;
    }

    .field.wide {
      grid-column: 1 / -1;
    }

    input,
    select,
    textarea {
      font: inherit;
      padding: 10px 12px;
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      background: white;
    }

    .row {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
      margin-top: 12px;
    }

    .row form {
      margin: 0;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font-size: 0.95rem;
      font-weight: 600;
      cursor: pointer;
      transition: transform 150ms ease;
    }

    button:active {
      transform: scale(0.98);
    }

    .primary {
      background: var(--accent);
      color: white;
    }

    .ghost {
      background: rgba(47, 72, 88, 0.08);
      color: var(--accent-2);
    }

    .danger {
      background: #c63b2b;
      color: white;
    }

    .mini {
      padding: 2px 10px;
      font-size: 0.75rem;
      background: transparent;
      color: #8b857d;
    }

    .saved-head,
    .record-head {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 8px;
    }

    .record {
      background: white;
      border-radius: 18px;
      padding: 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    dl {
      margin: 12px 0 0;
      display: grid;
      gap: 6px;
    }

    dl > div {
      display: grid;
      grid-template-columns: 140px 1fr auto;
      gap: 8px;
      align-items: start;
    }

    dt {
      color: #8b857d;
    }

    dd {
      margin: 0;
      white-space: pre-wrap;
    }

    .feedback {
      position: fixed;
      left: 24px;
      bottom: 24px;
      width: 44px;
      height: 44px;
      display: grid;
      place-items: center;
      border-radius: 999px;
      background: linear-gradient(135deg, var(--accent), var(--accent-2));
      color: white;
      text-decoration: none;
      box-shadow: 0 8px 16px rgba(47, 72, 88, 0.24);
      transition: transform 200ms ease;
    }

    .feedback:hover {
      transform: scale(1.2);
    }

    #toast {
      position: fixed;
      right: 24px;
      bottom: 24px;
      max-width: 320px;
      padding: 14px 18px;
      border-radius: 16px;
      background: var(--accent-2);
      color: white;
      box-shadow: var(--shadow);
      opacity: 0;
      transition: opacity 200ms ease;
      pointer-events: none;
    }

    #toast.show {
      opacity: 1;
    }

    #toast[data-type="error"] {
      background: #c63b2b;
    }

    #toast p {
      margin: 4px 0 0;
      font-size: 0.9rem;
    }

    @media (max-width: 600px) {
      .card {
        padding: 20px 16px;
      }
      dl > div {
        grid-template-columns: 1fr auto;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>채용 지원서 관리 시스템</h1>
        <p class="subtitle">한 번 입력하고 어디든 복사해서 사용하세요! (저장된 항목 {{TOTAL}}개)</p>
      </div>
      <div class="visitors">방문자 수: <strong id="visitor-count">-</strong><span id="visitor-new" class="badge" hidden>NEW</span></div>
    </header>

    {{NOTICE}}

    <div class="row">
      <button class="primary" type="button" data-copy="/api/copy">전체 복사</button>
    </div>

    <nav>{{NAV}}</nav>

    {{SECTIONS}}
  </main>

  <a class="feedback" href="{{FEEDBACK_URL}}" target="_blank" rel="noopener noreferrer" title="건의사항">💬</a>

  <div id="toast" role="status"><strong id="toast-title"></strong><p id="toast-body"></p></div>

  <script>
    const toast = document.getElementById('toast');
    let toastTimer = null;

    const showToast = (title, body, type) => {
      document.getElementById('toast-title').textContent = title;
      document.getElementById('toast-body').textContent = body;
      toast.dataset.type = type;
      toast.classList.add('show');
      clearTimeout(toastTimer);
      toastTimer = setTimeout(() => toast.classList.remove('show'), 3000);
    };

    const copyFrom = async (url) => {
      let res;
      try {
        res = await fetch(url, { method: 'POST' });
      } catch (err) {
        showToast('❌ 복사 실패', '서버에 연결할 수 없습니다.', 'error');
        return;
      }

      if (!res.ok) {
        showToast('❌ 복사 실패', await res.text(), 'error');
        return;
      }

      const body = await res.json();
      if (body.backend === 'browser') {
        try {
          await navigator.clipboard.writeText(body.text);
        } catch (err) {
          showToast('복사 실패', '클립보드 접근이 차단되었습니다.', 'error');
          return;
        }
      }
      showToast('📋 복사 완료!', body.message, 'ok');
    };

    document.querySelectorAll('[data-copy]').forEach((button) => {
      button.addEventListener('click', () => copyFrom(button.dataset.copy));
    });

    const canvasSample = () => {
      const canvas = document.createElement('canvas');
      const ctx = canvas.getContext('2d');
      if (ctx) {
        ctx.textBaseline = 'top';
        ctx.font = '14px Arial';
        ctx.fillText('Visitor tracking', 2, 2);
      }
      return canvas.toDataURL ? canvas.toDataURL() : '';
    };

    const countVisit = async () => {
      const res = await fetch('/api/visit', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({
          user_agent: navigator.userAgent,
          language: navigator.language,
          screen_width: screen.width,
          screen_height: screen.height,
          timezone_offset: new Date().getTimezoneOffset(),
          canvas: canvasSample()
        })
      });
      if (!res.ok) {
        return;
      }
      const body = await res.json();
      document.getElementById('visitor-count').textContent = body.total.toLocaleString();
      document.getElementById('visitor-new').hidden = !body.is_new;
    };

    countVisit().catch(() => {});
  </script>
</body>
</html>
"#;
