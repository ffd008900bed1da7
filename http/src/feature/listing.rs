use std::path::Path;

use tokio::{fs, io};

use crate::utils::{html_escape, percent_encode_path};

struct Entry {
    name: String,
    is_dir: bool,
    is_symlink: bool,
}

/// Render an HTML index of `dir`. `display_path` is the decoded URL path
/// shown in the title.
pub async fn render_listing(dir: &Path, display_path: &str) -> io::Result<String> {
    let mut entries = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        // an entry that vanished mid-listing is shown as a plain name
        let is_symlink = entry
            .file_type()
            .await
            .is_ok_and(|file_type| file_type.is_symlink());
        // follow links so a linked directory is listed as one
        let is_dir = fs::metadata(entry.path())
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);

        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
            is_symlink,
        });
    }
    entries.sort_by_key(|entry| entry.name.to_lowercase());

    let title = html_escape(display_path);
    let mut page = format!(
        "<!DOCTYPE HTML>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>Directory listing for {title}</title>\n\
         </head>\n\
         <body>\n\
         <h1>Directory listing for {title}</h1>\n\
         <hr>\n\
         <ul>\n"
    );

    for entry in &entries {
        let link = match entry.is_dir {
            true => format!("{}/", entry.name),
            false => entry.name.clone(),
        };
        // `@` takes the place of the directory slash
        let display = match (entry.is_symlink, entry.is_dir) {
            (true, _) => format!("{}@", entry.name),
            (false, true) => format!("{}/", entry.name),
            (false, false) => entry.name.clone(),
        };

        page.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            html_escape(&percent_encode_path(&link)),
            html_escape(&display)
        ));
    }

    page.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    Ok(page)
}
