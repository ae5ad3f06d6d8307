//! Test fixtures for Confluence API responses
//!
//! Content responses shaped like `GET /wiki/rest/api/content/{id}` with
//! `expand=body.storage,version,space,history,metadata.labels,children.attachment`.

use serde_json::json;

// Sample response for a basic Confluence page
pub fn sample_page_response() -> serde_json::Value {
  json!({
    "id": "123456",
    "type": "page",
    "status": "current",
    "title": "Getting Started Guide",
    "body": {
      "storage": {
        "value": "<h1>Getting Started</h1><p>Welcome to our documentation!</p><p>This guide will help you get started with our product.</p>",
        "representation": "storage"
      }
    },
    "space": {
      "key": "DOCS",
      "name": "Documentation"
    },
    "version": {
      "number": 4,
      "when": "2024-02-10T09:30:00.000Z",
      "by": { "accountId": "5b10ac8d82e05b22cc7d4ef5", "displayName": "Test User" }
    },
    "history": {
      "createdDate": "2023-11-01T08:00:00.000Z",
      "createdBy": {
        "accountId": "5b10ac8d82e05b22cc7d4ef5",
        "displayName": "Test User",
        "email": "testuser@example.com"
      }
    },
    "metadata": {
      "labels": {
        "results": [
          { "id": "1001", "name": "onboarding", "prefix": "global" },
          { "id": "1002", "name": "guide", "prefix": "global" }
        ]
      }
    },
    "_links": {
      "base": "https://example.atlassian.net/wiki",
      "webui": "/spaces/DOCS/pages/123456/Getting+Started+Guide"
    }
  })
}

// Sample response for a page with complex formatting
pub fn sample_complex_page_response() -> serde_json::Value {
  json!({
    "id": "789012",
    "type": "page",
    "status": "current",
    "title": "API Documentation",
    "body": {
      "storage": {
        "value": r#"<h1>API Documentation</h1>
<h2>Endpoints</h2>
<ul>
  <li><code>/api/users</code> - User management</li>
  <li><code>/api/posts</code> - Content management</li>
</ul>
<ac:structured-macro ac:name="warning"><ac:rich-text-body><p>Tokens expire after <strong>24 hours</strong>.</p></ac:rich-text-body></ac:structured-macro>
<h2>Code Examples</h2>
<ac:structured-macro ac:name="code" ac:schema-version="1">
  <ac:parameter ac:name="language">python</ac:parameter>
  <ac:plain-text-body><![CDATA[import requests

def get_users():
    if len(users) < 1 and ok:
        return requests.get('https://api.example.com/users')]]></ac:plain-text-body>
</ac:structured-macro>
<table><tbody>
<tr><th>Method</th><th>Path</th></tr>
<tr><td>GET</td><td><code>/api/users</code></td></tr>
<tr><td>POST</td><td><p>Create a user</p><ul><li>requires admin</li></ul></td></tr>
</tbody></table>"#,
        "representation": "storage"
      }
    },
    "space": {
      "key": "DEV",
      "name": "Developer Portal"
    },
    "version": { "number": 12, "when": "2024-04-18T16:45:00.000Z" },
    "history": {
      "createdBy": { "accountId": "5b10ac8d82e05b22cc7d4ef6", "displayName": "API Team" }
    },
    "_links": {
      "base": "https://example.atlassian.net/wiki",
      "webui": "/spaces/DEV/pages/789012/API+Documentation"
    }
  })
}

// Sample response for a page with internal links
pub fn sample_page_with_links_response() -> serde_json::Value {
  json!({
    "id": "345678",
    "type": "page",
    "status": "current",
    "title": "Installation Guide",
    "body": {
      "storage": {
        "value": r#"<h1>Installation</h1>
<p>See the <ac:link><ri:page ri:content-title="Getting Started Guide" /></ac:link> for prerequisites.</p>
<p>Background reading: <a href="/wiki/spaces/DOCS/pages/789012/API+Documentation">API docs</a>.</p>
<h2>Steps</h2>
<ol>
  <li>Download the installer</li>
  <li>Run the setup wizard</li>
  <li>Configure your settings</li>
</ol>"#,
        "representation": "storage"
      }
    },
    "space": {
      "key": "DOCS",
      "name": "Documentation"
    },
    "version": { "number": 2 },
    "history": {
      "createdBy": { "accountId": "5b10ac8d82e05b22cc7d4ef5", "displayName": "Test User" }
    },
    "_links": {
      "base": "https://example.atlassian.net/wiki",
      "webui": "/spaces/DOCS/pages/345678/Installation+Guide"
    }
  })
}

// Sample response for a page with images
pub fn sample_page_with_images_response() -> serde_json::Value {
  json!({
    "id": "456789",
    "type": "page",
    "status": "current",
    "title": "Architecture Diagram",
    "body": {
      "storage": {
        "value": r#"<h1>System Architecture</h1>
<p>Here's our high-level architecture:</p>
<ac:image ac:height="400">
  <ri:attachment ri:filename="architecture.png" />
</ac:image>
<p>The diagram shows three main components:</p>
<ul>
  <li>Frontend (React)</li>
  <li>Backend (Node.js)</li>
  <li>Database (PostgreSQL)</li>
</ul>"#,
        "representation": "storage"
      }
    },
    "space": {
      "key": "ARCH",
      "name": "Architecture"
    },
    "version": { "number": 3 },
    "history": {
      "createdBy": { "accountId": "5b10ac8d82e05b22cc7d4ef7", "displayName": "Architect" }
    },
    "children": {
      "attachment": {
        "results": [
          {
            "id": "att456",
            "title": "architecture.png",
            "version": { "number": 1 },
            "extensions": { "mediaType": "image/png", "fileSize": 20480 },
            "_links": { "download": "/download/attachments/456789/architecture.png?version=1" }
          }
        ]
      }
    },
    "_links": {
      "base": "https://example.atlassian.net/wiki",
      "webui": "/spaces/ARCH/pages/456789/Architecture+Diagram"
    }
  })
}

// Sample response for a page embedding a Mermaid diagram attachment
pub fn sample_page_with_diagram_response() -> serde_json::Value {
  json!({
    "id": "567890",
    "type": "page",
    "status": "current",
    "title": "Checkout Flow",
    "body": {
      "storage": {
        "value": r#"<p>Current state: <ac:structured-macro ac:name="status"><ac:parameter ac:name="colour">Green</ac:parameter><ac:parameter ac:name="title">LIVE</ac:parameter></ac:structured-macro></p>
<ac:structured-macro ac:name="mermaid-cloud"><ac:parameter ac:name="filename">checkout-flow</ac:parameter><ac:parameter ac:name="revision">2</ac:parameter></ac:structured-macro>
<ac:structured-macro ac:name="expand"><ac:parameter ac:name="title">Notes</ac:parameter><ac:rich-text-body><p>Retries are handled by the cart service.</p></ac:rich-text-body></ac:structured-macro>"#,
        "representation": "storage"
      }
    },
    "space": {
      "key": "ENG",
      "name": "Engineering"
    },
    "version": { "number": 5 },
    "history": {
      "createdBy": { "accountId": "5b10ac8d82e05b22cc7d4ef8", "displayName": "Payments Team" }
    },
    "children": {
      "attachment": {
        "results": [
          {
            "id": "att901",
            "title": "checkout-flow.svg",
            "version": { "number": 2 },
            "extensions": { "mediaType": "image/svg+xml", "fileSize": 4096 },
            "_links": { "download": "/download/attachments/567890/checkout-flow.svg" }
          },
          {
            "id": "att900",
            "title": "checkout-flow.mmd",
            "version": { "number": 2 },
            "extensions": { "mediaType": "text/plain", "fileSize": 64 },
            "_links": { "download": "/download/attachments/567890/checkout-flow.mmd?version=2" }
          },
          {
            "id": "att899",
            "title": "checkout-flow.mmd",
            "version": { "number": 1 },
            "extensions": { "mediaType": "text/plain", "fileSize": 48 },
            "_links": { "download": "/download/attachments/567890/checkout-flow.mmd?version=1" }
          }
        ]
      }
    },
    "_links": {
      "base": "https://example.atlassian.net/wiki",
      "webui": "/spaces/ENG/pages/567890/Checkout+Flow"
    }
  })
}

// Sample error response for page not found
pub fn sample_not_found_error_response(page_id: &str) -> serde_json::Value {
  json!({
    "statusCode": 404,
    "message": format!("No content found with id: ContentId{{id={page_id}}}"),
    "reason": "Not Found"
  })
}
