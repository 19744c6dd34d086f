//! Shared fixtures for integration tests: a small blog application.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use axum::http::header::LOCATION;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::Response;
use serde::{Deserialize, Serialize};

use mvc_dispatch::binding::{Arguments, Param};
use mvc_dispatch::config::{MvcConfig, RouteConfig};
use mvc_dispatch::controller::{
    controller_class_name, Action, ActionError, ControllerBuilder, ControllerDescriptor,
};
use mvc_dispatch::model::Bindable;
use mvc_dispatch::routing::defaults;
use mvc_dispatch::view::View;
use mvc_dispatch::MvcApp;

pub const NAMESPACE: &str = "blog";

/// A post bound from request data.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub body: String,
    pub published: bool,
}

impl Bindable for Post {}

pub struct BaseController {
    pub site: String,
}

pub struct PostsController {
    base: BaseController,
}

fn posts_base(controller: &mut PostsController) -> &mut BaseController {
    &mut controller.base
}

fn failed(e: impl std::fmt::Display) -> ActionError {
    ActionError::Failed(e.to_string())
}

pub fn base_controller() -> ControllerDescriptor {
    ControllerBuilder::new(controller_class_name(NAMESPACE, "base"), |_| {
        Ok(BaseController {
            site: "base".into(),
        })
    })
    .action(Action::new("about"), |c: &mut BaseController, _| {
        Ok(format!("about {}", c.site))
    })
    .build()
}

pub fn posts_controller() -> ControllerDescriptor {
    ControllerBuilder::new(controller_class_name(NAMESPACE, "posts"), |_| {
        Ok(PostsController {
            base: BaseController {
                site: "the blog".into(),
            },
        })
    })
    .extends(&base_controller(), posts_base)
    .action(
        Action::new("show").param(Param::string("id")),
        |_: &mut PostsController, args: Arguments| Ok(format!("post {}", args.str("id")?)),
    )
    .action(
        Action::new("show_post")
            .at("show")
            .method(Method::POST)
            .param(Param::string("id")),
        |_: &mut PostsController, args: Arguments| {
            Ok(format!("updated post {}", args.str("id")?))
        },
    )
    .action(
        Action::new("create")
            .method(Method::POST)
            .param(Param::model::<Post>("post")),
        |_: &mut PostsController, mut args: Arguments| {
            let post: Post = args.take("post")?;
            serde_json::to_string(&post).map_err(failed)
        },
    )
    .action(
        Action::new("page")
            .param(Param::view("view"))
            .param(Param::string("id")),
        |_: &mut PostsController, mut args: Arguments| {
            let mut view: View = args.take("view")?;
            view.set("id", args.str("id")?).map_err(failed)?;
            Ok(view)
        },
    )
    .action(
        Action::new("search").param(Param::string("slug")),
        |_: &mut PostsController, args: Arguments| Ok(args.str("slug")?.to_string()),
    )
    .action(Action::new("count"), |_: &mut PostsController, _| Ok(42_u32))
    .action(Action::new("nothing"), |_: &mut PostsController, _| Ok(()))
    .action(Action::new("fail"), |_: &mut PostsController, _| {
        Err::<String, _>(ActionError::Failed("storage offline".into()))
    })
    .action(Action::new("archive"), |_: &mut PostsController, _| {
        let mut response: Response = Response::new("moved".into());
        *response.status_mut() = StatusCode::SEE_OTHER;
        response
            .headers_mut()
            .insert(LOCATION, HeaderValue::from_static("/posts/index"));
        Ok(response)
    })
    .build()
}

/// `/post/{id}` for single posts, then a conventional catch-all.
pub fn blog_config(home: &Path) -> MvcConfig {
    let mut config = MvcConfig {
        namespace: NAMESPACE.to_string(),
        home: home.to_path_buf(),
        ..MvcConfig::default()
    };
    config.routes = vec![
        RouteConfig::new(
            "post",
            "/post/{id}",
            defaults([("controller", "posts"), ("action", "show")]),
        ),
        RouteConfig::new(
            "default",
            "/{controller}/{action}/{id}",
            defaults([("controller", "posts"), ("action", "index"), ("id", "")]),
        ),
    ];
    config
}

pub fn blog_app(home: &Path) -> MvcApp {
    MvcApp::builder(blog_config(home))
        .controller(posts_controller())
        .controller(base_controller())
        .build()
        .unwrap()
}

/// Write `views/posts/posts_page.tpl.html` under `home`.
pub fn write_views(home: &Path) {
    let dir = home.join("views").join("posts");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("posts_page.tpl.html"), "<h1>Post {{ id }}</h1>").unwrap();
}
