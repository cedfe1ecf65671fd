use rhai::Dynamic;

/// printf-style formatting for script log lines.
///
/// Supports `%s`, `%v`, `%d`, `%f`, `%q` and `%%`. A verb with no matching
/// argument renders as `%!<verb>(MISSING)`; surplus arguments are ignored.
pub fn format_log(format: &str, args: &[Dynamic]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut args = args.iter();
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(verb) = chars.next() else {
            out.push('%');
            break;
        };
        if verb == '%' {
            out.push('%');
            continue;
        }
        if !matches!(verb, 's' | 'v' | 'd' | 'f' | 'q') {
            out.push('%');
            out.push(verb);
            continue;
        }
        match args.next() {
            Some(arg) => out.push_str(&render(verb, arg)),
            None => out.push_str(&format!("%!{verb}(MISSING)")),
        }
    }
    out
}

fn render(verb: char, arg: &Dynamic) -> String {
    match verb {
        'd' => {
            if let Ok(i) = arg.as_int() {
                i.to_string()
            } else if let Ok(f) = arg.as_float() {
                (f.trunc() as i64).to_string()
            } else {
                arg.to_string()
            }
        }
        'f' => {
            if let Ok(f) = arg.as_float() {
                format!("{f:.6}")
            } else if let Ok(i) = arg.as_int() {
                format!("{:.6}", i as f64)
            } else {
                arg.to_string()
            }
        }
        'q' => format!("{:?}", arg.to_string()),
        _ => arg.to_string(),
    }
}
