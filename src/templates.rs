/// Minimal page with the comment form, for trying the endpoint by hand
const FORM_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>New comment</title>
  <style>
    body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }
    label { display: block; margin-top: .75rem; }
    input, textarea { width: 100%; }
    .honeypot { display: none; }
  </style>
</head>
<body>
  <h1>New comment</h1>
  <form method="post" action="{{ENDPOINT}}">
    <label>Name <input name="name" maxlength="128" required></label>
    <label class="honeypot">Last name <input name="last_name" tabindex="-1" autocomplete="off"></label>
    <label>Email <input name="email" type="email" maxlength="128" required></label>
    <label>Website <input name="website" maxlength="128"></label>
    <label>Avatar <input name="avatar_type" value="gravatar" maxlength="32"></label>
    <label>Page <input name="page_id" maxlength="1024" required></label>
    <label>Content type <input name="content_type" value="md" maxlength="4"></label>
    <label>Comment <textarea name="body" rows="8" maxlength="8192" required></textarea></label>
    <p>Start a line with <code>"""</code> to quote.</p>
    <button type="submit">Send</button>
  </form>
</body>
</html>
"#;

/// Render the test form posting to `endpoint`
pub fn render_comment_form(endpoint: &str) -> String {
    FORM_TEMPLATE.replace(
        "{{ENDPOINT}}",
        &html_escape::encode_double_quoted_attribute(endpoint),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_posts_to_endpoint() {
        let html = render_comment_form("/api/comment");
        assert!(html.contains(r#"action="/api/comment""#));
        assert!(!html.contains("{{ENDPOINT}}"));
    }

    #[test]
    fn endpoint_is_attribute_escaped() {
        let html = render_comment_form(r#"/x"><script>"#);
        assert!(html.contains(r#"action="/x&quot;&gt;&lt;script&gt;""#));
    }
}
