//! Presentational decoration of article `body_html`.
//!
//! Plain literal substitution: tags that already carry attributes still get
//! the prefix, and nothing is parsed or escaped.

/// Ordered (needle, replacement) pairs applied by [`decorate`].
const RULES: &[(&str, &str)] = &[
    ("<img ", r#"<img loading="lazy" class="rounded-lg shadow-sm" "#),
    (
        "<h1>",
        r#"<h1 class="text-4xl font-extrabold mb-6 mt-10 text-foreground leading-tight">"#,
    ),
    (
        "<h2>",
        r#"<h2 class="text-3xl font-bold mb-4 mt-8 text-foreground leading-snug">"#,
    ),
    (
        "<h3>",
        r#"<h3 class="text-2xl font-semibold mb-3 mt-6 text-foreground">"#,
    ),
    (
        "<h4>",
        r#"<h4 class="text-xl font-medium mb-2 mt-4 text-foreground">"#,
    ),
    (
        "<h5>",
        r#"<h5 class="text-lg font-medium mb-2 mt-3 text-foreground">"#,
    ),
    (
        "<h6>",
        r#"<h6 class="text-base font-medium mb-1 mt-2 text-foreground">"#,
    ),
    (
        "<p>",
        r#"<p class="mb-6 leading-loose text-foreground text-base">"#,
    ),
    (
        "<ul>",
        r#"<ul class="mb-6 pl-8 list-disc text-foreground space-y-1">"#,
    ),
    (
        "<ol>",
        r#"<ol class="mb-6 pl-8 list-decimal text-foreground space-y-1">"#,
    ),
    ("<li>", r#"<li class="leading-relaxed">"#),
    (
        "<blockquote>",
        r#"<blockquote class="border-l-4 border-primary pl-6 italic mb-6 text-foreground bg-muted/30 p-4 rounded-r-lg shadow-sm">"#,
    ),
    ("<pre>", r#"<pre class="mb-6 overflow-x-auto">"#),
    ("<code>", r#"<code class="mb-6 font-mono text-sm">"#),
    (
        "<a ",
        r#"<a class="text-primary hover:text-primary/80 transition-colors duration-200 underline decoration-2 underline-offset-2" "#,
    ),
    ("<hr>", r#"<hr class="my-10 h-px">"#),
    ("<strong>", r#"<strong class="font-semibold text-foreground">"#),
    ("<em>", r#"<em class="italic text-muted-foreground">"#),
];

/// Inject presentational classes into raw article HTML.
///
/// # Examples
///
/// ```
/// use devread::html::decorate;
///
/// assert_eq!(
///     decorate("<p>hi</p>"),
///     r#"<p class="mb-6 leading-loose text-foreground text-base">hi</p>"#
/// );
/// ```
pub fn decorate(raw_html: &str) -> String {
    RULES
        .iter()
        .fold(raw_html.to_string(), |html, (needle, replacement)| {
            if html.contains(needle) {
                html.replace(needle, replacement)
            } else {
                html
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_paragraph() {
        assert!(decorate("<p>hi</p>")
            .contains(r#"<p class="mb-6 leading-loose text-foreground text-base">hi</p>"#));
    }

    #[test]
    fn test_every_occurrence_replaced() {
        let out = decorate("<li>a</li><li>b</li>");
        assert_eq!(
            out,
            r#"<li class="leading-relaxed">a</li><li class="leading-relaxed">b</li>"#
        );
    }

    #[test]
    fn test_img_and_link_keep_existing_attributes() {
        let out = decorate(r#"<a href="/x"><img src="/y.png"></a>"#);
        assert_eq!(
            out,
            concat!(
                r#"<a class="text-primary hover:text-primary/80 transition-colors duration-200 underline decoration-2 underline-offset-2" href="/x">"#,
                r#"<img loading="lazy" class="rounded-lg shadow-sm" src="/y.png"></a>"#
            )
        );
    }

    #[test]
    fn test_tag_with_existing_class_gets_prefix_anyway() {
        let out = decorate(r#"<img class="x" src="a">"#);
        assert_eq!(
            out,
            r#"<img loading="lazy" class="rounded-lg shadow-sm" class="x" src="a">"#
        );
    }

    #[test]
    fn test_attributed_block_tags_untouched() {
        // only the bare `<p>` form is matched
        assert_eq!(decorate(r#"<p id="intro">x</p>"#), r#"<p id="intro">x</p>"#);
    }

    #[test]
    fn test_code_inside_pre() {
        let out = decorate("<pre><code>fn main() {}</code></pre>");
        assert_eq!(
            out,
            r#"<pre class="mb-6 overflow-x-auto"><code class="mb-6 font-mono text-sm">fn main() {}</code></pre>"#
        );
    }

    #[test]
    fn test_headings_and_emphasis() {
        let out = decorate("<h2>T</h2><hr><strong>b</strong><em>i</em>");
        assert!(out.contains(r#"<h2 class="text-3xl font-bold mb-4 mt-8 text-foreground leading-snug">"#));
        assert!(out.contains(r#"<hr class="my-10 h-px">"#));
        assert!(out.contains(r#"<strong class="font-semibold text-foreground">"#));
        assert!(out.contains(r#"<em class="italic text-muted-foreground">"#));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(decorate(""), "");
    }

    proptest! {
        #[test]
        fn prop_text_without_tags_is_unchanged(s in "[^<]*") {
            prop_assert_eq!(decorate(&s), s);
        }

        #[test]
        fn prop_decorate_is_deterministic(s in ".*") {
            prop_assert_eq!(decorate(&s), decorate(&s));
        }
    }
}
