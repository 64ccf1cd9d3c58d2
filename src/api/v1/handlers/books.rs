/*
 * Responsibility
 * - GET /books        : AppState (構築済みの共有状態) から BookStore を取得
 * - GET /scoped/books : リクエスト Context から BOOK_STORE を型付きで取得
 * - GET 以外は 405。BookStore の失敗は 500 (詳細はログのみ)
 */
use axum::{Extension, extract::State, http::Method};

use crate::{
    api::v1::dto::books::render_listing,
    context::Context,
    error::AppError,
    repos::books::BOOK_STORE,
    state::AppState,
};

pub async fn list_books(
    method: Method,
    State(state): State<AppState>,
    Extension(ctx): Extension<Context>,
) -> Result<String, AppError> {
    if method != Method::GET {
        return Err(AppError::MethodNotAllowed);
    }

    let books = state.books.all(&ctx).await?;
    Ok(render_listing(&books))
}

pub async fn list_books_scoped(
    method: Method,
    Extension(ctx): Extension<Context>,
) -> Result<String, AppError> {
    if method != Method::GET {
        return Err(AppError::MethodNotAllowed);
    }

    let store = ctx.value(&BOOK_STORE)?;
    let books = store.all(&ctx).await?;
    Ok(render_listing(&books))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{
        app::build_router,
        repos::books::{Book, MockBookStore},
    };

    const PATHS: [&str; 2] = ["/api/v1/books", "/api/v1/scoped/books"];

    fn sample_books() -> Vec<Book> {
        vec![
            Book {
                isbn: "978-1503261969".into(),
                title: "Emma".into(),
                author: "Jayne Austen".into(),
                price: 9.44,
            },
            Book {
                isbn: "978-1505255607".into(),
                title: "The Time Machine".into(),
                author: "H. G. Wells".into(),
                price: 5.99,
            },
        ]
    }

    fn app(store: MockBookStore) -> Router {
        build_router(AppState::new(Arc::new(store), Duration::from_secs(5)))
    }

    async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn renders_one_line_per_book() {
        let expected = "978-1503261969, Emma, Jayne Austen, £9.44\n\
                        978-1505255607, The Time Machine, H. G. Wells, £5.99\n";

        for path in PATHS {
            let (status, content_type, body) =
                send(app(MockBookStore::new(sample_books())), Method::GET, path).await;

            assert_eq!(status, StatusCode::OK, "{path}");
            assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
            assert_eq!(body, expected, "{path}");
        }
    }

    #[tokio::test]
    async fn repeated_requests_render_the_same_body() {
        let app = app(MockBookStore::new(sample_books()));

        let (_, _, first) = send(app.clone(), Method::GET, PATHS[0]).await;
        let (_, _, second) = send(app.clone(), Method::GET, PATHS[0]).await;
        let (_, _, scoped) = send(app, Method::GET, PATHS[1]).await;

        assert_eq!(first, second);
        assert_eq!(first, scoped);
    }

    #[tokio::test]
    async fn no_books_is_ok_and_empty() {
        for path in PATHS {
            let (status, _, body) = send(app(MockBookStore::new(Vec::new())), Method::GET, path).await;
            assert_eq!(status, StatusCode::OK, "{path}");
            assert_eq!(body, "", "{path}");
        }
    }

    #[tokio::test]
    async fn store_failure_is_500_without_detail() {
        let secret = "relation \"books\" does not exist";

        for path in PATHS {
            let (status, _, body) = send(app(MockBookStore::failing(secret)), Method::GET, path).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{path}");
            assert_eq!(body, "Internal Server Error\n");
            assert!(!body.contains(secret));
        }
    }

    #[tokio::test]
    async fn non_get_is_405_whatever_the_store() {
        let methods = [Method::POST, Method::PUT, Method::DELETE, Method::PATCH, Method::HEAD];

        for path in PATHS {
            for method in methods.clone() {
                for store in [MockBookStore::new(sample_books()), MockBookStore::failing("down")] {
                    let (status, _, _) = send(app(store), method.clone(), path).await;
                    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {path}");
                }
            }
        }
    }

    #[tokio::test]
    async fn non_get_body_is_the_reason_phrase() {
        for path in PATHS {
            let (status, content_type, body) =
                send(app(MockBookStore::new(sample_books())), Method::POST, path).await;

            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{path}");
            assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
            assert_eq!(body, "Method Not Allowed\n", "{path}");
        }
    }

    #[tokio::test]
    async fn unbound_store_is_resource_not_available() {
        let err = list_books_scoped(Method::GET, Extension(Context::background()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ResourceNotAvailable(_)));
    }

    #[tokio::test]
    async fn expired_request_context_aborts_the_query() {
        let state = AppState::new(
            Arc::new(MockBookStore::new(sample_books())),
            Duration::from_secs(5),
        );
        let (ctx, cancel) = state.root.with_cancel();
        cancel.cancel();

        let err = list_books(Method::GET, State(state), Extension(ctx))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Query(crate::repos::error::RepoError::Aborted(_))
        ));
    }
}
