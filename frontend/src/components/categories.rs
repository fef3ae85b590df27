use leptos::prelude::*;
use leptos::task::spawn_local;
use taskhub_shared::{Category, CategoryCreate, CategoryUpdate};

use crate::components::icons::*;
use crate::components::layout::{Layout, confirm};
use crate::components::toast::use_notifier;
use crate::store::use_store;

/// 分类管理
#[component]
pub fn CategoriesPage() -> impl IntoView {
    let store = use_store();
    let notifier = use_notifier();

    let name = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());
    // 正在编辑的分类；None 表示表单用于新建
    let editing = RwSignal::new(Option::<i64>::None);

    Effect::new(move |_| {
        let store = store.get();
        spawn_local(async move {
            if let Err(e) = store.fetch_categories().await {
                notifier.error("加载分类失败", &e);
            }
        });
    });

    let reset = move || {
        editing.set(None);
        name.set(String::new());
        description.set(String::new());
    };

    let start_edit = move |category: Category| {
        editing.set(Some(category.id));
        name.set(category.name);
        description.set(category.description.unwrap_or_default());
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let n = name.get().trim().to_string();
        if n.is_empty() {
            notifier.warn("分类名称不能为空");
            return;
        }
        let d = description.get().trim().to_string();
        let d = (!d.is_empty()).then_some(d);

        let store = store.get();
        let editing_id = editing.get();
        spawn_local(async move {
            let result = match editing_id {
                Some(id) => {
                    let update = CategoryUpdate {
                        name: Some(n),
                        description: d,
                    };
                    store.update_category(id, update).await
                }
                None => {
                    let create = CategoryCreate {
                        name: n,
                        description: d,
                    };
                    store.create_category(create).await
                }
            };
            match result {
                Ok(c) => {
                    notifier.success(format!("分类「{}」已保存", c.name));
                    reset();
                }
                Err(e) => notifier.error("保存分类失败", &e),
            }
        });
    };

    let on_delete = move |id: i64| {
        if !confirm("删除分类后，其下的任务将变为无分类。确定删除吗？") {
            return;
        }
        let store = store.get();
        spawn_local(async move {
            match store.delete_category(id).await {
                Ok(()) => notifier.success("分类已删除"),
                Err(e) => notifier.error("删除分类失败", &e),
            }
        });
    };

    let categories = move || store.select(|s| s.task_categories().to_vec());

    view! {
        <Layout title="分类管理">
            <div class="card bg-base-100 shadow-xl">
                <form class="card-body flex-row flex-wrap items-end gap-4" on:submit=on_submit>
                    <div class="form-control">
                        <label for="cat_name" class="label"><span class="label-text">"名称"</span></label>
                        <input id="cat_name" type="text" class="input input-bordered input-sm"
                            on:input=move |ev| name.set(event_target_value(&ev))
                            prop:value=move || name.get()
                        />
                    </div>
                    <div class="form-control flex-1">
                        <label for="cat_desc" class="label"><span class="label-text">"描述"</span></label>
                        <input id="cat_desc" type="text" class="input input-bordered input-sm w-full"
                            on:input=move |ev| description.set(event_target_value(&ev))
                            prop:value=move || description.get()
                        />
                    </div>
                    <button class="btn btn-primary btn-sm gap-2">
                        {move || if editing.get().is_some() {
                            view! { <Pencil attr:class="h-4 w-4" /> "保存修改" }.into_any()
                        } else {
                            view! { <Plus attr:class="h-4 w-4" /> "添加分类" }.into_any()
                        }}
                    </button>
                    <Show when=move || editing.get().is_some()>
                        <button type="button" class="btn btn-ghost btn-sm" on:click=move |_| reset()>"取消"</button>
                    </Show>
                </form>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"名称"</th>
                                <th>"描述"</th>
                                <th>"任务数"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=move || categories().is_empty()>
                                <tr>
                                    <td colspan="4" class="text-center py-8 text-base-content/50">"暂无分类。"</td>
                                </tr>
                            </Show>
                            <For
                                each=categories
                                key=|c| (c.id, c.name.clone(), c.description.clone())
                                children=move |c| {
                                    let id = c.id;
                                    let for_edit = c.clone();
                                    view! {
                                        <tr>
                                            <td class="font-bold">
                                                <Tag attr:class="h-4 w-4 inline mr-1 opacity-50" />
                                                {c.name}
                                            </td>
                                            <td class="opacity-70">{c.description.unwrap_or_default()}</td>
                                            <td>{c.task_count.unwrap_or(0)}</td>
                                            <td>
                                                <div class="flex gap-1 justify-end">
                                                    <button class="btn btn-ghost btn-xs" on:click=move |_| start_edit(for_edit.clone())>
                                                        <Pencil attr:class="h-4 w-4" />
                                                    </button>
                                                    <button class="btn btn-ghost btn-xs text-error" on:click=move |_| on_delete(id)>
                                                        <Trash2 attr:class="h-4 w-4" />
                                                    </button>
                                                </div>
                                            </td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                </div>
            </div>
        </Layout>
    }
}
