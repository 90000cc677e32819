use pulldown_cmark::{html, Event, Options, Parser, Tag};

/// Converts a Markdown snippet (e.g., a newsletter summary) to HTML. Raw HTML
/// in the input is escaped rather than passed through.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).map(|ev| match ev {
        Event::Html(raw) => Event::Text(raw),
        ev => ev,
    });
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

/// Flattens a Markdown snippet to the text a reader sees once it is rendered
/// with [`to_html`]: inline markup is dropped and block boundaries become
/// single spaces.
pub fn to_text(markdown: &str) -> String {
    let mut output = String::with_capacity(markdown.len());
    for event in Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH) {
        match event {
            Event::Text(text) | Event::Code(text) | Event::Html(text) => {
                output.push_str(&text)
            }
            Event::SoftBreak | Event::HardBreak => output.push(' '),
            Event::End(Tag::Paragraph)
            | Event::End(Tag::Heading(_))
            | Event::End(Tag::Item)
            | Event::End(Tag::CodeBlock(_)) => {
                if !output.is_empty() && !output.ends_with(' ') {
                    output.push(' ');
                }
            }
            _ => {}
        }
    }
    output.trim_end().to_owned()
}
