//! Server-rendered catalog page.

use crate::catalog::{ATMOSPHERES, Book, BrowseState, FAVORITES_KEY, HEROES, PACES, STYLES};
use quick_xml::escape::escape;
use std::collections::HashMap;

/// Render the catalog page for the given browse state.
///
/// `comments` maps book IDs to their comment count; missing IDs show zero.
pub fn render(
    title: &str,
    state: &BrowseState,
    books: &[Book],
    comments: &HashMap<String, usize>,
) -> String {
    let filter = &state.filter;
    let mut cards = String::new();
    for book in state.visible(books) {
        let count = comments.get(&book.id).copied().unwrap_or(0);
        cards.push_str(&render_card(book, state.favorites.contains(&book.id), count));
    }

    let mut selects = String::new();
    selects.push_str(&render_select("atmosphere", "Атмосфера — Любая", ATMOSPHERES, &filter.atmosphere));
    selects.push_str(&render_select("pace", "Темп — Любой", PACES, &filter.pace));
    selects.push_str(&render_select("hero", "Тип героя — Любой", HEROES, &filter.hero));
    selects.push_str(&render_select("style", "Стиль — Любой", STYLES, &filter.style));

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>
        body {{ font-family: system-ui, sans-serif; margin: 0; color: #fff; background: linear-gradient(#0b132b, #071027); min-height: 100vh; }}
        header, main, footer {{ max-width: 1200px; margin: 0 auto; padding: 1.5rem; }}
        header {{ display: flex; align-items: center; gap: 1.5rem; }}
        .brand {{ font-size: 1.5rem; font-weight: bold; letter-spacing: 0.05em; }}
        .favs {{ margin-left: auto; opacity: 0.8; }}
        main {{ display: grid; grid-template-columns: 1fr 3fr; gap: 1.5rem; }}
        aside {{ background: rgba(255,255,255,0.06); padding: 1rem; border-radius: 12px; border: 1px solid rgba(255,255,255,0.1); }}
        aside select, aside input {{ width: 100%; padding: 0.5rem; margin-bottom: 0.75rem; border-radius: 4px; box-sizing: border-box; }}
        .grid {{ display: grid; grid-template-columns: repeat(auto-fill, minmax(240px, 1fr)); gap: 1.5rem; }}
        .card {{ background: #fff; color: #222; border-radius: 8px; overflow: hidden; display: flex; flex-direction: column; }}
        .cover {{ height: 11rem; display: flex; align-items: center; justify-content: center; background: #f3f4f6; }}
        .cover img {{ max-height: 10rem; }}
        .body {{ padding: 1rem; flex: 1; display: flex; flex-direction: column; }}
        .byline {{ color: #6b7280; font-size: 0.875rem; }}
        .desc {{ color: #4b5563; font-size: 0.875rem; flex: 1; }}
        .comments {{ color: #6b7280; font-size: 0.75rem; }}
        .badge {{ font-size: 0.75rem; padding: 0.2rem 0.5rem; border: 1px solid #ccc; border-radius: 999px; margin-right: 0.25rem; }}
        .fav {{ float: right; border: 0; border-radius: 6px; padding: 0.25rem 0.75rem; background: #9ca3af; color: #fff; cursor: pointer; }}
        .fav.on {{ background: #e11d48; }}
        .empty {{ opacity: 0.7; }}
        footer {{ text-align: center; opacity: 0.7; font-size: 0.875rem; }}
    </style>
</head>
<body>
    <header>
        <div class="brand">{title}</div>
        <div class="favs">Избранное: <span id="fav-count">0</span></div>
    </header>
    <main>
        <aside>
            <h3>Фильтры</h3>
            <form method="get" action="/">
{selects}                <input name="q" placeholder="Поиск по названию/автору" value="{query}">
                <button type="submit">Применить</button>
                <a href="/">Сброс</a>
            </form>
        </aside>
        <section>
            <div class="grid">
{cards}            </div>
{empty}        </section>
    </main>
    <footer>{title} — {count} из {total}</footer>
    <script>
        (function () {{
            var key = "{key}";
            var favs = [];
            try {{ favs = JSON.parse(localStorage.getItem(key) || "[]"); }} catch (e) {{ favs = []; }}
            function paint() {{
                document.getElementById("fav-count").textContent = favs.length;
                document.querySelectorAll(".fav").forEach(function (b) {{
                    b.classList.toggle("on", favs.indexOf(b.dataset.id) !== -1);
                }});
            }}
            document.querySelectorAll(".fav").forEach(function (b) {{
                b.addEventListener("click", function () {{
                    var i = favs.indexOf(b.dataset.id);
                    if (i === -1) {{ favs.push(b.dataset.id); }} else {{ favs.splice(i, 1); }}
                    localStorage.setItem(key, JSON.stringify(favs));
                    paint();
                }});
            }});
            paint();
        }})();
    </script>
</body>
</html>"#,
        title = escape(title),
        selects = selects,
        query = escape(filter.query.as_str()),
        cards = cards,
        empty = if cards.is_empty() {
            "            <p class=\"empty\">Ничего не найдено</p>\n"
        } else {
            ""
        },
        count = state.visible(books).len(),
        total = books.len(),
        key = FAVORITES_KEY,
    )
}

fn render_select(name: &str, any_label: &str, options: &[&str], selected: &str) -> String {
    let mut html = format!(
        "                <select name=\"{}\">\n                    <option value=\"\">{}</option>\n",
        name, any_label
    );
    for option in options {
        let marker = if *option == selected { " selected" } else { "" };
        html.push_str(&format!(
            "                    <option{}>{}</option>\n",
            marker,
            escape(*option)
        ));
    }
    html.push_str("                </select>\n");
    html
}

fn render_card(book: &Book, favorite: bool, comments: usize) -> String {
    let cover = book.cover.as_deref().unwrap_or_default();
    format!(
        r#"                <div class="card">
                    <div class="cover"><img src="{cover}" alt="{title}"></div>
                    <div class="body">
                        <h3>{title}</h3>
                        <div class="byline">{byline}</div>
                        <p class="desc">{excerpt}</p>
                        <div class="comments">Комментарии: {comments}</div>
                        <div>
                            <span class="badge">{atmosphere}</span><span class="badge">{pace}</span><span class="badge">{style}</span>
                            <button class="fav{on}" data-id="{id}">❤</button>
                        </div>
                    </div>
                </div>
"#,
        cover = escape(cover),
        title = escape(book.title.as_str()),
        byline = escape(&book.byline()),
        excerpt = escape(&book.excerpt()),
        comments = comments,
        atmosphere = escape(badge(&book.atmosphere)),
        pace = escape(badge(&book.pace)),
        style = escape(badge(&book.style)),
        on = if favorite { " on" } else { "" },
        id = escape(book.id.as_str()),
    )
}

fn badge(tag: &str) -> &str {
    if tag.is_empty() { "—" } else { tag }
}
