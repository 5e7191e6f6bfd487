//! The GUI these tools pair with defines its palette as `Color` constants
//! scattered through the codebase. This walks its source, finds them, and
//! dumps a JSON palette that designers can review without reading Rust.

use anyhow::Result;
use serde::Serialize;
use syn::visit::Visit;
use walkdir::WalkDir;

use util::{prettyprint_usize, Timer};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColorConstant {
    pub name: String,
    pub file: String,
    pub hex: String,
}

pub fn run(path: String, output: Option<String>) -> Result<()> {
    let mut timer = Timer::new("extract colors");

    let mut found = Vec::new();
    let mut files = 0;
    for entry in WalkDir::new(&path).into_iter().filter_map(|e| e.ok()) {
        if entry.path().extension().map(|x| x == "rs").unwrap_or(false) {
            files += 1;
            let file = entry.path().display().to_string();
            let raw = fs_err::read_to_string(entry.path())?;
            match syn::parse_file(&raw) {
                Ok(parsed) => scrape_file(&file, &parsed, &mut found),
                // Probably a different syn edition or a macro-heavy file;
                // the palette doesn't have to be exhaustive
                Err(err) => warn!("Couldn't parse {}: {}", file, err),
            }
        }
    }
    found.sort_by(|a, b| a.name.cmp(&b.name));
    info!(
        "Found {} color constants in {} files",
        prettyprint_usize(found.len()),
        prettyprint_usize(files)
    );

    let json = serde_json::to_string_pretty(&found)?;
    match output {
        Some(out) => {
            fs_err::write(&out, json)?;
            println!("Wrote {}", out);
        }
        None => println!("{}", json),
    }
    timer.done();
    Ok(())
}

fn scrape_file(file: &str, parsed: &syn::File, found: &mut Vec<ColorConstant>) {
    let mut visitor = ColorVisitor { file, found };
    visitor.visit_file(parsed);
}

struct ColorVisitor<'a> {
    file: &'a str,
    found: &'a mut Vec<ColorConstant>,
}

impl<'a, 'ast> Visit<'ast> for ColorVisitor<'a> {
    fn visit_item_const(&mut self, item: &'ast syn::ItemConst) {
        self.check(&item.ident, &item.expr);
        syn::visit::visit_item_const(self, item);
    }

    // Lots of palettes hang constants off `impl Color`
    fn visit_impl_item_const(&mut self, item: &'ast syn::ImplItemConst) {
        self.check(&item.ident, &item.expr);
        syn::visit::visit_impl_item_const(self, item);
    }
}

impl<'a> ColorVisitor<'a> {
    fn check(&mut self, ident: &syn::Ident, expr: &syn::Expr) {
        if let Some(hex) = parse_color(expr) {
            self.found.push(ColorConstant {
                name: ident.to_string(),
                file: self.file.to_string(),
                hex,
            });
        }
    }
}

/// If this expression constructs a color, normalize it to #rrggbb (or
/// #rrggbbaa when the alpha isn't 1).
fn parse_color(expr: &syn::Expr) -> Option<String> {
    let call = match expr {
        syn::Expr::Call(call) => call,
        _ => {
            return None;
        }
    };
    let path = match call.func.as_ref() {
        syn::Expr::Path(p) => &p.path,
        _ => {
            return None;
        }
    };
    let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
    // Match Color::rgb and widgetry::Color::rgb alike
    if segments.len() < 2 || segments[segments.len() - 2] != "Color" {
        return None;
    }
    let args: Vec<&syn::Expr> = call.args.iter().collect();

    match (segments.last().unwrap().as_str(), args.len()) {
        ("rgb", 3) => Some(rgb_hex(
            int_arg(args[0])?,
            int_arg(args[1])?,
            int_arg(args[2])?,
            1.0,
        )),
        ("rgba", 4) => Some(rgb_hex(
            int_arg(args[0])?,
            int_arg(args[1])?,
            int_arg(args[2])?,
            float_arg(args[3])?,
        )),
        ("rgb_f", 3) => Some(rgb_hex(
            channel(float_arg(args[0])?),
            channel(float_arg(args[1])?),
            channel(float_arg(args[2])?),
            1.0,
        )),
        ("grey", 1) | ("gray", 1) => {
            let v = channel(float_arg(args[0])?);
            Some(rgb_hex(v, v, v, 1.0))
        }
        ("hex", 1) => {
            let lit = str_arg(args[0])?;
            let raw = lit.strip_prefix('#').unwrap_or(&lit).to_ascii_lowercase();
            if raw.len() != 6 && raw.len() != 8 {
                return None;
            }
            Some(format!("#{}", raw))
        }
        _ => None,
    }
}

fn rgb_hex(r: u8, g: u8, b: u8, alpha: f64) -> String {
    if alpha >= 1.0 {
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, channel(alpha))
    }
}

fn channel(x: f64) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn int_arg(expr: &syn::Expr) -> Option<u8> {
    if let syn::Expr::Lit(syn::ExprLit {
        lit: syn::Lit::Int(x),
        ..
    }) = expr
    {
        return x.base10_parse().ok();
    }
    None
}

fn float_arg(expr: &syn::Expr) -> Option<f64> {
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Float(x),
            ..
        }) => x.base10_parse().ok(),
        // Somebody wrote 1 instead of 1.0
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Int(x),
            ..
        }) => x.base10_parse().ok(),
        _ => None,
    }
}

fn str_arg(expr: &syn::Expr) -> Option<String> {
    if let syn::Expr::Lit(syn::ExprLit {
        lit: syn::Lit::Str(x),
        ..
    }) = expr
    {
        return Some(x.value());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scrape(source: &str) -> Vec<ColorConstant> {
        let mut found = Vec::new();
        scrape_file("test.rs", &syn::parse_file(source).unwrap(), &mut found);
        found
    }

    #[test]
    fn find_constants() {
        let found = scrape(
            r##"
            pub const RED: Color = Color::rgb(255, 0, 0);
            pub const HIGHLIGHT: Color = Color::rgba(0, 255, 0, 0.5);
            const BACKGROUND: widgetry::Color = widgetry::Color::hex("#2B2B2B");
            const NOT_A_COLOR: usize = 42;
            const ALSO_NOT: Color = some_func(1, 2, 3);

            impl Palette {
                pub const GREY: Color = Color::grey(0.5);
                pub const PANEL: Color = Color::rgb_f(0.2, 0.4, 1.0);
            }
            "##,
        );

        let hexes: Vec<(&str, &str)> = found
            .iter()
            .map(|c| (c.name.as_str(), c.hex.as_str()))
            .collect();
        assert_eq!(
            hexes,
            vec![
                ("RED", "#ff0000"),
                ("HIGHLIGHT", "#00ff0080"),
                ("BACKGROUND", "#2b2b2b"),
                ("GREY", "#808080"),
                ("PANEL", "#3366ff"),
            ]
        );
    }

    #[test]
    fn malformed_hex_is_skipped() {
        assert!(scrape(r#"const X: Color = Color::hex("nope");"#).is_empty());
    }
}
