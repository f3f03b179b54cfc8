//! XML payload templates.

use std::borrow::Cow;

const HEADER: &str = r#"<?xml version="1.0" encoding="utf-8"?><wp:Notification xmlns:wp="WPNotification">"#;
const FOOTER: &str = "</wp:Notification>";

/// Tile notification document.
pub(crate) fn tile(image_ref: &str, count: &str, title: &str) -> String {
    format!(
        "{HEADER}<wp:Tile>\
         <wp:BackgroundImage>{image_ref}</wp:BackgroundImage>\
         <wp:Count>{count}</wp:Count>\
         <wp:Title>{title}</wp:Title>\
         </wp:Tile>{FOOTER}"
    )
}

/// Toast notification document.
pub(crate) fn toast(text1: &str, text2: &str) -> String {
    format!(
        "{HEADER}<wp:Toast>\
         <wp:Text1>{text1}</wp:Text1>\
         <wp:Text2>{text2}</wp:Text2>\
         </wp:Toast>{FOOTER}"
    )
}

/// Escape XML metacharacters in element text.
pub(crate) fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert!(matches!(escape("plain"), Cow::Borrowed(_)));
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &apos;Jerry&apos;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_toast_document() {
        assert_eq!(
            toast("a", "b"),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
             <wp:Notification xmlns:wp=\"WPNotification\"><wp:Toast>\
             <wp:Text1>a</wp:Text1><wp:Text2>b</wp:Text2>\
             </wp:Toast></wp:Notification>"
        );
    }
}
