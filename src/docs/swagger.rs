//! Swagger UI page loaded from a CDN.

const SWAGGER_UI_VERSION: &str = "5.18.2";

/// HTML page that renders the document served at `spec_url`.
pub fn swagger_html(title: &str, spec_url: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{title}</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {{
      window.ui = SwaggerUIBundle({{
        url: "{spec_url}",
        dom_id: "#swagger-ui",
        deepLinking: true,
        displayRequestDuration: true,
      }});
    }};
  </script>
</body>
</html>
"##,
        title = escape_html(title),
        version = SWAGGER_UI_VERSION,
        spec_url = escape_html(spec_url),
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_points_at_spec_url() {
        let html = swagger_html("Shalom API", "/swagger/json");
        assert!(html.contains(r#"url: "/swagger/json""#));
        assert!(html.contains("<title>Shalom API</title>"));
    }

    #[test]
    fn test_title_is_escaped() {
        let html = swagger_html("<script>", "/swagger/json");
        assert!(html.contains("&lt;script&gt;"));
    }
}
