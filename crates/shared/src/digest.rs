use crate::models::Article;

pub const DEFAULT_HEADING: &str = "Daily AI in Automation Digest";

pub struct DigestRenderer;

impl DigestRenderer {
    pub fn generate_html(articles: &[Article], heading: &str) -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("  <meta charset=\"UTF-8\">\n");
        html.push_str(&format!("  <title>{}</title>\n", Self::escape_html(heading)));
        html.push_str("  <style>\n");
        html.push_str("    body { font-family: 'Georgia', serif; background-color: #f8f9fa; color: #333; margin: 0; padding: 20px; }\n");
        html.push_str("    .container { max-width: 600px; margin: auto; background: white; padding: 20px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }\n");
        html.push_str("    h1 { text-align: center; color: #444; }\n");
        html.push_str("    .article { border-bottom: 1px solid #ddd; padding-bottom: 15px; margin-bottom: 15px; }\n");
        html.push_str("    .title { font-size: 1.2em; font-weight: bold; color: #2a7ae2; text-decoration: none; }\n");
        html.push_str("    .summary { margin-top: 8px; font-size: 0.95em; line-height: 1.5; }\n");
        html.push_str("    .footer { text-align: center; font-size: 0.8em; color: #999; margin-top: 20px; }\n");
        html.push_str("  </style>\n");
        html.push_str("</head>\n<body>\n");
        html.push_str("<div class=\"container\">\n");
        html.push_str(&format!("<h1>{}</h1>\n", Self::escape_html(heading)));

        for article in articles {
            html.push_str("  <div class=\"article\">\n");
            html.push_str(&format!(
                "    <a class=\"title\" href=\"{}\">{}</a>\n",
                Self::escape_html(&article.url),
                Self::escape_html(&article.title)
            ));
            html.push_str(&format!(
                "    <p class=\"summary\">{}</p>\n",
                Self::escape_html(&article.summary)
            ));
            html.push_str("  </div>\n");
        }

        html.push_str("  <div class=\"footer\">\n");
        html.push_str("    <p>Delivered automatically by news-digest</p>\n");
        html.push_str("  </div>\n");
        html.push_str("</div>\n");
        html.push_str("</body>\n</html>");
        html
    }

    /// Plain-text alternative for mail clients that don't render HTML
    pub fn generate_text(articles: &[Article], heading: &str) -> String {
        let mut text = format!("{}\n{}\n\n", heading, "=".repeat(heading.chars().count()));

        for (index, article) in articles.iter().enumerate() {
            text.push_str(&format!("{}. {}\n", index + 1, article.title));
            text.push_str(&format!("   {}\n", article.url));
            if !article.summary.is_empty() {
                text.push_str(&format!("   {}\n", article.summary));
            }
            text.push('\n');
        }

        text
    }

    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }
}
