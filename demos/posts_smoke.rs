use e2e_log_sink::backend::logger_config;
use e2e_log_sink::config::SuiteConfig;
use e2e_log_sink::context::run_test;
use e2e_log_sink::env::{env_or, BASE_URL_API_ENV};
use e2e_log_sink::error::ApiError;
use e2e_log_sink::posts::{NewPost, PostsApi};
use e2e_log_sink::reqwest_transport::ReqwestTransport;

/// Smoke test against a JSONPlaceholder-style API.
///
/// Sinks, level and timeouts come from the environment; see
/// `e2e_log_sink::env` for the variable names.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut suite = SuiteConfig::from_env();
    suite.api_base_url = env_or(BASE_URL_API_ENV, "https://jsonplaceholder.typicode.com");
    let config = logger_config(&suite).await?;

    run_test("posts smoke", config, suite, |ctx| async move {
        let posts = PostsApi::new(ctx.api("JsonPlaceholderAPI", ReqwestTransport::default()));

        ctx.logger().step(1, "Fetch a single post");
        let post = posts.by_id(1).await?;
        ctx.logger().info(format!("Post 1 is titled {:?}", post.title));

        ctx.logger().step(2, "Create a post");
        let created = posts
            .create(&NewPost {
                title: "smoke".to_string(),
                body: "created by the posts smoke demo".to_string(),
                user_id: 1,
            })
            .await?;
        ctx.logger().info(format!("Created post {}", created.id));

        Ok::<_, ApiError<reqwest::Error>>(())
    })
    .await?;

    Ok(())
}
