use console::Style;
use termstyle::{rgb_to_ansi256, Styles};

/// The fixed `{{ns.fn("...")}}` registry.
pub fn template_styles() -> Styles {
    Styles::new()
        .missing_indicator("")
        .add("style.bold", Style::new().bold())
        .add("style.dim", Style::new().dim())
        .add("style.italic", Style::new().italic())
        .add("style.underline", Style::new().underlined())
        .add("color.red", Style::new().red())
        .add("color.green", Style::new().green())
        .add("color.yellow", Style::new().yellow())
        .add("color.blue", Style::new().blue())
        .add("color.magenta", Style::new().magenta())
        .add("color.cyan", Style::new().cyan())
        .add("color.white", Style::new().white())
        .add("color.gray", Style::new().color256(rgb_to_ansi256((128, 128, 128))))
}
