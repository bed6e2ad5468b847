use rocket::response::content::RawHtml;
use rocket::State;

use crate::content::PageLoader;
use crate::render;

use super::resolve_page;

#[get("/")]
pub async fn landing(loader: &State<PageLoader>) -> RawHtml<String> {
    let res = resolve_page(loader).await;
    RawHtml(render::render_landing(&res, loader.origin()))
}

#[get("/portfolio")]
pub async fn portfolio(loader: &State<PageLoader>) -> RawHtml<String> {
    let res = resolve_page(loader).await;
    RawHtml(render::render_portfolio_page(&res))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![landing, portfolio]
}
