use crate::models::page::{Colors, Typography};
use crate::render::html_escape;

/// Keep a CSS value from closing the declaration or the style element.
fn css_value(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Stylesheet URL for a Google Fonts family at the weights the site uses.
pub fn google_fonts_url(font_name: &str) -> String {
    let name = font_name.split_whitespace().collect::<Vec<_>>().join("+");
    if name.is_empty() {
        return String::new();
    }
    format!(
        "https://fonts.googleapis.com/css2?family={}:wght@300;400;500;600;700&display=swap",
        name
    )
}

/// Turn what the editor submits into the stored typography: a custom font
/// name becomes the primary font stack and gets a Google Fonts URL when none
/// was given.
pub fn resolve_custom_font(mut typography: Typography) -> Typography {
    let custom = typography
        .custom_font_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| n.to_string());

    match custom {
        Some(name) => {
            typography.primary_font = format!("'{}', sans-serif", name);
            let url = typography
                .google_fonts_url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(|u| u.to_string())
                .unwrap_or_else(|| google_fonts_url(&name));
            typography.custom_font_name = Some(name);
            typography.google_fonts_url = Some(url);
        }
        None => {
            typography.custom_font_name = None;
            typography.google_fonts_url = typography
                .google_fonts_url
                .filter(|u| !u.trim().is_empty());
        }
    }
    typography
}

/// `:root` custom properties for the theme colors and typography.
pub fn build_css_variables(colors: Option<&Colors>, typography: Option<&Typography>) -> String {
    let default_colors = Colors::default();
    let default_type = Typography::default();
    let colors = colors.unwrap_or(&default_colors);
    let t = typography.unwrap_or(&default_type);

    let pick = |v: &str, fallback: &str| -> String {
        let v = css_value(v);
        if v.is_empty() { fallback.to_string() } else { v }
    };

    let mut css = String::from(":root {\n");
    for (name, value) in colors.css_pairs() {
        css.push_str(&format!("    {}: {};\n", name, css_value(&value)));
    }
    css.push_str(&format!(
        "    --primary-font: {};\n    --h1-size: {};\n    --h2-size: {};\n    --body-size: {};\n    --font-weight: {};\n    --line-height: {};\n",
        pick(&t.primary_font, &default_type.primary_font),
        pick(&t.h1_size, &default_type.h1_size),
        pick(&t.h2_size, &default_type.h2_size),
        pick(&t.body_size, &default_type.body_size),
        pick(&t.font_weight, &default_type.font_weight),
        pick(&t.line_height, &default_type.line_height),
    ));
    css.push('}');
    css
}

/// Font stylesheet link for a custom Google font, if one is configured.
pub fn build_font_links(typography: Option<&Typography>) -> String {
    let url = match typography
        .and_then(|t| t.google_fonts_url.as_deref())
        .map(str::trim)
        .filter(|u| u.starts_with("https://"))
    {
        Some(u) => u,
        None => return String::new(),
    };

    format!(
        r#"    <link rel="preconnect" href="https://fonts.googleapis.com">
    <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin>
    <link href="{}" rel="stylesheet" data-google-font="true">
"#,
        html_escape(url)
    )
}
