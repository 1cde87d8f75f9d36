use async_trait::async_trait;
use serde::Deserialize;
use crate::error::Result;
use crate::providers::http::{join_url, HttpClient};
use crate::providers::NewsProvider;
use crate::store::NewsItem;

pub struct NewsDataClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

impl NewsDataClient {
    pub fn new(http: HttpClient, base_url: &str, api_key: &str) -> Self {
        NewsDataClient {
            http,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl NewsProvider for NewsDataClient {
    async fn headlines(&self, query: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let url = join_url(&self.base_url, "news");
        let params = [
            ("apikey", self.api_key.clone()),
            ("q", query.to_string()),
            ("language", "en".to_string()),
            ("size", limit.to_string()),
        ];
        let data: NewsDataResponse = self.http.get_json(&url, &params).await?;

        Ok(data.results.into_iter()
            .take(limit)
            .map(|article| NewsItem {
                id: article.article_id,
                title: article.title,
                description: article.description,
                url: article.link,
                source: article.source_id.unwrap_or_default(),
                published_at: article.pub_date.unwrap_or_default(),
            })
            .collect())
    }
}

#[derive(Deserialize)]
struct NewsDataResponse {
    #[serde(default)]
    results: Vec<NewsDataArticle>,
}

#[derive(Deserialize)]
struct NewsDataArticle {
    article_id: String,
    title: String,
    description: Option<String>,
    link: String,
    source_id: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}
