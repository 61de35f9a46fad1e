//! Shared fixtures: a mock site serving chart, search, title and plot pages.
#![allow(dead_code)]

use cinerank::catalog::MovieManager;
use cinerank::config::Config;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct Film {
    pub title: &'static str,
    pub imdb_id: &'static str,
    pub year: &'static str,
    pub director: &'static str,
    pub rating: &'static str,
    pub genres: &'static [&'static str],
    pub plot: &'static str,
    pub storyline: &'static str,
}

pub const SHAWSHANK: Film = Film {
    title: "The Shawshank Redemption",
    imdb_id: "tt0111161",
    year: "1994",
    director: "Frank Darabont",
    rating: "9.3",
    genres: &["Drama"],
    plot: "Two imprisoned men bond over a number of years.",
    storyline: "Chronicles the experiences of a formerly successful banker as a prisoner.",
};

pub const GODFATHER: Film = Film {
    title: "The Godfather",
    imdb_id: "tt0068646",
    year: "1972",
    director: "Francis Ford Coppola",
    rating: "9.2",
    genres: &["Crime", "Drama"],
    plot: "The aging patriarch of an organized crime dynasty transfers control to his son.",
    storyline: "The Godfather \"Don\" Vito Corleone is the head of the Corleone mafia family.",
};

pub const DARK_KNIGHT: Film = Film {
    title: "The Dark Knight",
    imdb_id: "tt0468569",
    year: "2008",
    director: "Christopher Nolan",
    rating: "9.0",
    genres: &["Action", "Crime", "Drama"],
    plot: "Batman faces the Joker.",
    storyline: "Set within a year after the events of Batman Begins.",
};

pub fn test_config(server: &MockServer) -> Config {
    Config {
        chart_url: format!("{}/chart/top/", server.uri()),
        site_url: server.uri(),
        retry_delay_secs: 0.0,
        pacing_secs: 0.0,
        request_timeout_secs: 5,
        ..Config::default()
    }
}

pub fn test_manager(server: &MockServer) -> MovieManager {
    MovieManager::new(test_config(server)).unwrap()
}

pub fn chart_page(titles: &[&str]) -> String {
    let rows: String = titles
        .iter()
        .enumerate()
        .map(|(i, t)| {
            format!(
                "<li class=\"ipc-metadata-list-summary-item\">\
                 <a class=\"ipc-title-link-wrapper\" href=\"/title/tt{i}/\">\
                 <h3 class=\"ipc-title__text\">{}. {t}</h3></a></li>",
                i + 1
            )
        })
        .collect();
    format!("<html><body><ul class=\"ipc-metadata-list\">{rows}</ul></body></html>")
}

pub fn search_page(film: &Film) -> String {
    format!(
        "<html><body><ul>\
         <li><a href=\"/name/nm0000001/\">Someone</a></li>\
         <li><a href=\"/title/{}/?ref_=fn_al_tt_1\">{}</a></li>\
         </ul></body></html>",
        film.imdb_id, film.title
    )
}

pub fn title_page(film: &Film) -> String {
    let genres: String = film
        .genres
        .iter()
        .map(|g| format!("<a href=\"/search/?genres={g}\"><span>{g}</span></a>"))
        .collect();
    format!(
        "<html><body>\
         <div data-testid=\"hero-media__poster\"><img src=\"https://img.example.com/{id}.jpg\"></div>\
         <div data-testid=\"hero-rating-bar__aggregate-rating__score\"><span>{rating}</span><span>/10</span></div>\
         <div data-testid=\"genres\">{genres}</div>\
         <p data-testid=\"plot\"><span>{plot}</span></p>\
         <ul><li data-testid=\"title-pc-principal-credit\"><span>Director</span>\
         <a href=\"/name/nm1/?ref_=tt_ov_dr#director\">{director}</a></li></ul>\
         <ul><li data-testid=\"title-details-releasedate\"><a>January 1, {year} (United States)</a></li></ul>\
         </body></html>",
        id = film.imdb_id,
        rating = film.rating,
        plot = film.plot,
        director = film.director,
        year = film.year,
    )
}

pub fn plot_page(film: &Film) -> String {
    format!(
        "<html><body>\
         <div class=\"ipc-html-content-inner-div\">{plot}</div>\
         <div class=\"ipc-html-content-inner-div\">A second summary.</div>\
         <div class=\"ipc-html-content-inner-div\">{storyline}</div>\
         </body></html>",
        plot = film.plot,
        storyline = film.storyline,
    )
}

pub async fn mount_chart(server: &MockServer, titles: &[&str], expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path("/chart/top/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(chart_page(titles)))
        .expect(expected_hits)
        .mount(server)
        .await;
}

/// Mounts search, title and plot pages for `film`, each expected `expected_hits` times.
pub async fn mount_film(server: &MockServer, film: &Film, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path("/find/"))
        .and(query_param("q", film.title))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_page(film)))
        .expect(expected_hits)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/title/{}/", film.imdb_id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(title_page(film)))
        .expect(expected_hits)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/title/{}/plotsummary/", film.imdb_id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(plot_page(film)))
        .expect(expected_hits)
        .mount(server)
        .await;
}
